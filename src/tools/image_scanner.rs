use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 支援的副檔名（不分大小寫）
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "heic"];

/// 需要外部工具轉檔的格式
const CONVERT_EXTENSION: &str = "heic";

#[derive(Debug, Clone)]
pub struct ImageFileInfo {
    pub path: PathBuf,
    /// HEIC 等專有格式需要先轉成標準格式才能解碼
    pub needs_conversion: bool,
}

impl ImageFileInfo {
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// 遞迴掃描目錄下所有支援的影像檔案，按路徑排序確保結果可重現
pub fn scan_image_files(directory: &Path) -> Result<Vec<ImageFileInfo>> {
    let mut images: Vec<ImageFileInfo> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let extension = entry.path().extension()?.to_str()?.to_lowercase();
            if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                return None;
            }
            Some(ImageFileInfo {
                needs_conversion: extension == CONVERT_EXTENSION,
                path: entry.into_path(),
            })
        })
        .collect();

    images.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(images)
}
