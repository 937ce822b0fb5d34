use crate::tools::heic_converter::{ConvertError, HeicConverter};
use crate::tools::image_scanner::ImageFileInfo;
use image::DynamicImage;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("無法解碼影像: {0}")]
    Unreadable(#[from] image::ImageError),
    #[error("HEIC 轉檔失敗: {0}")]
    Convert(#[from] ConvertError),
}

/// 暫存檔守衛，離開作用域時刪除檔案（包含錯誤提前返回的路徑）
struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    fn new_jpeg() -> Self {
        let path = std::env::temp_dir().join(format!("blur_organize_{}.jpg", Uuid::new_v4()));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        // 轉檔失敗時檔案可能不存在，刪除失敗不影響流程
        let _ = fs::remove_file(&self.path);
    }
}

/// 把掃描到的影像載入為可評分的點陣圖
///
/// 標準格式直接解碼；HEIC 先經外部工具轉成暫存 JPEG 再解碼，
/// 暫存檔無論成敗都會被刪除。
pub fn load_image(
    info: &ImageFileInfo,
    converter: &dyn HeicConverter,
) -> Result<DynamicImage, DecodeError> {
    if info.needs_conversion {
        let temp = TempFileGuard::new_jpeg();
        converter.convert(&info.path, temp.path())?;
        debug!("已轉檔至暫存檔 {}", temp.path().display());
        Ok(image::open(temp.path())?)
    } else {
        Ok(image::open(&info.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// 把預先準備好的 JPEG 複製到目的地，並記錄目的地路徑
    struct CopyConverter {
        source: PathBuf,
        last_dst: Mutex<Option<PathBuf>>,
    }

    impl HeicConverter for CopyConverter {
        fn convert(&self, _src: &Path, dst: &Path) -> Result<(), ConvertError> {
            fs::copy(&self.source, dst).map_err(ConvertError::Spawn)?;
            *self.last_dst.lock().unwrap() = Some(dst.to_path_buf());
            Ok(())
        }
    }

    /// 先在目的地留下半成品再失敗，模擬工具中途出錯
    struct FailingConverter {
        last_dst: Mutex<Option<PathBuf>>,
    }

    impl HeicConverter for FailingConverter {
        fn convert(&self, _src: &Path, dst: &Path) -> Result<(), ConvertError> {
            fs::write(dst, b"partial garbage").unwrap();
            *self.last_dst.lock().unwrap() = Some(dst.to_path_buf());
            Err(ConvertError::Timeout(std::time::Duration::from_secs(30)))
        }
    }

    fn write_jpeg(path: &Path) {
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        image.save(path).unwrap();
    }

    #[test]
    fn test_load_standard_format_directly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_jpeg(&path);

        let info = ImageFileInfo {
            path,
            needs_conversion: false,
        };
        let converter = FailingConverter {
            last_dst: Mutex::new(None),
        };

        let image = load_image(&info, &converter).unwrap();
        assert_eq!(image.width(), 8);
        // 直接解碼的路徑不應觸碰轉換器
        assert!(converter.last_dst.lock().unwrap().is_none());
    }

    #[test]
    fn test_load_unreadable_file_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        fs::write(&path, b"not an image at all").unwrap();

        let info = ImageFileInfo {
            path,
            needs_conversion: false,
        };
        let converter = FailingConverter {
            last_dst: Mutex::new(None),
        };

        match load_image(&info, &converter) {
            Err(DecodeError::Unreadable(_)) => {}
            other => panic!("應該是解碼錯誤: {other:?}"),
        }
    }

    #[test]
    fn test_converted_image_decodes_and_temp_is_removed() {
        let temp_dir = TempDir::new().unwrap();
        let jpeg_source = temp_dir.path().join("prepared.jpg");
        write_jpeg(&jpeg_source);

        let heic_path = temp_dir.path().join("photo.heic");
        fs::write(&heic_path, b"pretend heic bytes").unwrap();

        let converter = CopyConverter {
            source: jpeg_source,
            last_dst: Mutex::new(None),
        };
        let info = ImageFileInfo {
            path: heic_path,
            needs_conversion: true,
        };

        let image = load_image(&info, &converter).unwrap();
        assert_eq!(image.width(), 8);

        let dst = converter.last_dst.lock().unwrap().clone().unwrap();
        assert!(!dst.exists(), "暫存檔應該已被刪除");
    }

    #[test]
    fn test_converter_failure_still_cleans_up_temp() {
        let temp_dir = TempDir::new().unwrap();
        let heic_path = temp_dir.path().join("photo.heic");
        fs::write(&heic_path, b"pretend heic bytes").unwrap();

        let converter = FailingConverter {
            last_dst: Mutex::new(None),
        };
        let info = ImageFileInfo {
            path: heic_path,
            needs_conversion: true,
        };

        match load_image(&info, &converter) {
            Err(DecodeError::Convert(ConvertError::Timeout(_))) => {}
            other => panic!("應該是轉檔逾時: {other:?}"),
        }

        let dst = converter.last_dst.lock().unwrap().clone().unwrap();
        assert!(!dst.exists(), "半成品暫存檔也應該被刪除");
    }
}
