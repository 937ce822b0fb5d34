use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 整批結果文件的檔名，寫在來源資料夾根目錄
pub const RESULTS_FILE_NAME: &str = "blurry_results.json";

/// 逐行日誌檔名，放在分隔資料夾內
pub const LOG_FILE_NAME: &str = "log.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub input_path: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub folder_path: String,
    pub threshold: f64,
    pub results: Vec<ScoreRecord>,
}

/// 寫入整批結果文件，直接覆蓋舊檔不做合併
pub fn write_results(folder: &Path, result: &RunResult) -> Result<PathBuf> {
    let path = folder.join(RESULTS_FILE_NAME);
    let content = serde_json::to_string_pretty(result).context("無法序列化執行結果")?;

    fs::write(&path, content).with_context(|| format!("無法寫入結果到 {}", path.display()))?;

    Ok(path)
}

/// 對日誌檔追加一行評分記錄，檔案不存在時建立
pub fn append_log_line(blur_folder: &Path, name: &str, score: f64) -> Result<()> {
    let path = blur_folder.join(LOG_FILE_NAME);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("無法開啟日誌檔 {}", path.display()))?;

    writeln!(file, "Processed: {name}, Score: {score}")
        .with_context(|| format!("無法寫入日誌檔 {}", path.display()))?;

    Ok(())
}
