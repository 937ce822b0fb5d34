use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use rayon::prelude::*;

/// 局部銳利度圖，與灰階圖同尺寸，邊框像素為 0
pub type BlurMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// 模糊估計結果
#[derive(Debug, Clone)]
pub struct BlurEstimate {
    pub blur_map: BlurMap,
    /// 拉普拉斯響應在內部區域的變異數，越低越模糊
    pub score: f64,
}

/// 估計影像模糊程度
///
/// 演算法固定為：灰階化後套用 3x3 十字拉普拉斯核
/// `[[0, 1, 0], [1, -4, 1], [0, 1, 0]]`，分數取響應圖內部區域
/// （不含一圈邊框）的變異數。相同的像素內容永遠得到相同分數，
/// 分數只有在同一核心設定下比較才有意義。
#[must_use]
pub fn estimate_blur(image: &RgbImage) -> BlurEstimate {
    let gray = image::imageops::grayscale(image);
    let (width, height) = gray.dimensions();

    if width < 3 || height < 3 {
        return BlurEstimate {
            blur_map: BlurMap::new(width, height),
            score: 0.0,
        };
    }

    let w = width as usize;
    let h = height as usize;
    let pixels = gray.as_raw();
    let mut responses = vec![0.0f32; w * h];

    // 逐列平行計算拉普拉斯響應，整數累加確保跨執行緒結果一致
    let (sum, sum_sq) = responses
        .par_chunks_mut(w)
        .enumerate()
        .map(|(y, row)| {
            if y == 0 || y == h - 1 {
                return (0i64, 0i64);
            }

            let mut row_sum = 0i64;
            let mut row_sum_sq = 0i64;
            for x in 1..w - 1 {
                let center = i32::from(pixels[y * w + x]);
                let top = i32::from(pixels[(y - 1) * w + x]);
                let bottom = i32::from(pixels[(y + 1) * w + x]);
                let left = i32::from(pixels[y * w + x - 1]);
                let right = i32::from(pixels[y * w + x + 1]);

                let lap = top + bottom + left + right - 4 * center;
                row[x] = lap as f32;

                row_sum += i64::from(lap);
                row_sum_sq += i64::from(lap) * i64::from(lap);
            }
            (row_sum, row_sum_sq)
        })
        .reduce(|| (0i64, 0i64), |a, b| (a.0 + b.0, a.1 + b.1));

    let count = ((w - 2) * (h - 2)) as f64;
    let mean = sum as f64 / count;
    let mean_sq = sum_sq as f64 / count;
    let score = mean.mul_add(-mean, mean_sq).max(0.0);

    let blur_map =
        BlurMap::from_raw(width, height, responses).expect("response buffer matches dimensions");

    BlurEstimate { blur_map, score }
}

/// 將銳利度圖轉成可顯示的灰階圖
///
/// 取響應絕對值後做對數壓縮，再線性拉伸到 0..=255。純展示用途。
#[must_use]
pub fn pretty_blur_map(blur_map: &BlurMap) -> GrayImage {
    let (width, height) = blur_map.dimensions();
    let compressed: Vec<f32> = blur_map.as_raw().iter().map(|v| v.abs().ln_1p()).collect();

    let min = compressed.iter().copied().fold(f32::INFINITY, f32::min);
    let max = compressed.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if compressed.is_empty() || max <= min {
        return GrayImage::new(width, height);
    }

    let scale = 255.0 / (max - min);
    let bytes: Vec<u8> = compressed
        .iter()
        .map(|v| ((v - min) * scale).round() as u8)
        .collect();

    GrayImage::from_raw(width, height, bytes).expect("byte buffer matches dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn flat_image(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    fn checkerboard(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn test_flat_image_scores_zero() {
        let estimate = estimate_blur(&flat_image(32, 32, 128));
        assert_eq!(estimate.score, 0.0);
    }

    #[test]
    fn test_sharp_edges_score_higher_than_flat() {
        let sharp = estimate_blur(&checkerboard(32, 32));
        let flat = estimate_blur(&flat_image(32, 32, 128));
        assert!(sharp.score > flat.score);
        assert!(sharp.score > 1000.0, "棋盤格分數應該很高: {}", sharp.score);
    }

    #[test]
    fn test_score_is_deterministic() {
        let image = checkerboard(48, 36);
        let first = estimate_blur(&image);
        let second = estimate_blur(&image);
        assert_eq!(first.score, second.score);
        assert_eq!(first.blur_map.as_raw(), second.blur_map.as_raw());
    }

    #[test]
    fn test_score_is_non_negative() {
        let estimate = estimate_blur(&RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 0])
        }));
        assert!(estimate.score >= 0.0);
    }

    #[test]
    fn test_blur_map_matches_dimensions() {
        let estimate = estimate_blur(&flat_image(20, 10, 50));
        assert_eq!(estimate.blur_map.dimensions(), (20, 10));
    }

    #[test]
    fn test_tiny_image_scores_zero() {
        let estimate = estimate_blur(&flat_image(2, 2, 200));
        assert_eq!(estimate.score, 0.0);
        assert_eq!(estimate.blur_map.dimensions(), (2, 2));
    }

    #[test]
    fn test_pretty_blur_map_constant_is_black() {
        let map = BlurMap::from_pixel(8, 8, Luma([0.0]));
        let display = pretty_blur_map(&map);
        assert!(display.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_pretty_blur_map_spans_full_range() {
        let estimate = estimate_blur(&checkerboard(16, 16));
        let display = pretty_blur_map(&estimate.blur_map);
        assert_eq!(display.dimensions(), (16, 16));
        assert!(display.pixels().any(|p| p.0[0] == 255));
        assert!(display.pixels().any(|p| p.0[0] == 0));
    }
}
