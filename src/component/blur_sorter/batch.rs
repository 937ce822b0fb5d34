use crate::component::blur_sorter::result_sink::{self, RunResult, ScoreRecord};
use crate::tools::{
    HeicConverter, ensure_directory_exists, estimate_blur, load_image, scan_image_files,
    validate_directory_exists,
};
use anyhow::{Context, Result};
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單次批次執行的輸入，取代任何全域狀態
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub folder: PathBuf,
    pub threshold: f64,
}

/// 批次執行摘要
#[derive(Debug, Default)]
pub struct BatchReport {
    pub discovered: usize,
    pub scored: usize,
    pub moved: usize,
    /// 通道數不是 3 而被略過的影像
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
    pub results_path: Option<PathBuf>,
}

/// 分數嚴格低於閾值才算模糊，等於閾值不移動
#[must_use]
pub fn is_blurry(score: f64, threshold: f64) -> bool {
    score < threshold
}

/// 分隔資料夾命名：`<來源資料夾 basename>_blur_<整數閾值>`，位於來源資料夾內
#[must_use]
pub fn segregation_folder(folder: &Path, threshold: f64) -> PathBuf {
    let base = folder
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("images");
    folder.join(format!("{base}_blur_{}", threshold as i64))
}

/// 對資料夾執行一次完整的模糊分類
///
/// 每張影像依序經過：載入（必要時先轉檔）→ 評分 → 分類移動 → 寫日誌。
/// 單項失敗只記 warning 並跳過，不中止整批；分隔資料夾建立、日誌追加
/// 與結果文件寫入失敗會直接回傳錯誤，因為那會破壞稽核記錄。
pub fn run_batch(
    config: &RunConfig,
    converter: &dyn HeicConverter,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<BatchReport> {
    validate_directory_exists(&config.folder)?;

    let blur_folder = segregation_folder(&config.folder, config.threshold);
    ensure_directory_exists(&blur_folder)
        .with_context(|| format!("無法建立分隔資料夾 {}", blur_folder.display()))?;

    let images = scan_image_files(&config.folder)?;
    info!(
        "掃描 {} 找到 {} 張影像，閾值 {}",
        config.folder.display(),
        images.len(),
        config.threshold
    );

    let mut report = BatchReport {
        discovered: images.len(),
        ..Default::default()
    };
    let mut records: Vec<ScoreRecord> = Vec::new();

    let progress_bar = ProgressBar::new(images.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );

    for image_info in &images {
        if shutdown_signal.load(Ordering::SeqCst) {
            report.interrupted = true;
            progress_bar.abandon_with_message("處理已中斷");
            warn!("收到中斷訊號，停止處理");
            break;
        }

        let name = image_info.file_name();
        progress_bar.set_message(name.clone());

        let raster = match load_image(image_info, converter) {
            Ok(raster) => raster,
            Err(e) => {
                warn!("無法處理 {name}，跳過: {e}");
                report.failed += 1;
                progress_bar.inc(1);
                continue;
            }
        };

        // 只評分 3 通道影像，其它通道數直接略過，不算失敗也不移動
        let DynamicImage::ImageRgb8(rgb) = raster else {
            report.skipped += 1;
            progress_bar.inc(1);
            continue;
        };

        let estimate = estimate_blur(&rgb);
        info!("{name} 分數: {}", estimate.score);

        if is_blurry(estimate.score, config.threshold) {
            let destination = blur_folder.join(&name);
            match fs::rename(&image_info.path, &destination) {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    warn!("無法移動 {name} 到 {}: {e}", destination.display());
                    report.failed += 1;
                }
            }
        }

        // 每評完一項就追加一行，流程被打斷時已寫入的進度仍保留
        result_sink::append_log_line(&blur_folder, &name, estimate.score)?;
        records.push(ScoreRecord {
            input_path: name,
            score: estimate.score,
        });
        report.scored += 1;

        progress_bar.inc(1);
    }

    if !report.interrupted {
        progress_bar.finish_with_message("處理完成");
    }

    // 整批文件只在完整跑完且至少有一筆記錄時寫入
    if !records.is_empty() && !report.interrupted {
        let run_result = RunResult {
            folder_path: config.folder.display().to_string(),
            threshold: config.threshold,
            results: records,
        };
        let path = result_sink::write_results(&config.folder, &run_result)?;
        info!("整批結果已寫入 {}", path.display());
        report.results_path = Some(path);
    }

    Ok(report)
}
