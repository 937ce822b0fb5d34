use super::batch::{BatchReport, RunConfig, run_batch, segregation_folder};
use crate::config::save::{add_recent_path, save_settings};
use crate::config::{Config, THRESHOLD_OPTIONS};
use crate::tools::{SipsConverter, validate_directory_exists};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 模糊照片整理元件
pub struct BlurSorter {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl BlurSorter {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 模糊照片整理 ===").cyan().bold());

        // 取得輸入路徑
        let Some(input_path) = self.prompt_input_path()? else {
            return Ok(()); // ESC pressed
        };
        let directory = PathBuf::from(&input_path);

        validate_directory_exists(&directory)?;

        // 更新路徑歷史並儲存
        {
            let mut settings = self.config.settings.clone();
            add_recent_path(&mut settings, &input_path);
            if let Err(e) = save_settings(&settings) {
                warn!("無法儲存路徑歷史: {e}");
            }
        }

        // 選擇閾值
        let Some(threshold) = self.prompt_threshold()? else {
            return Ok(());
        };
        info!("選擇資料夾 {input_path}，閾值 {threshold}");

        let run_config = RunConfig {
            folder: directory,
            threshold,
        };

        println!("{}", style("分析影像中...").cyan());
        let converter = SipsConverter::new();
        let report = run_batch(&run_config, &converter, &self.shutdown_signal)?;

        self.print_summary(&run_config, &report);

        Ok(())
    }

    fn prompt_input_path(&self) -> Result<Option<String>> {
        let recent_paths = &self.config.settings.recent_paths;

        // 如果沒有歷史路徑，直接輸入
        if recent_paths.is_empty() {
            let path: String = Input::new()
                .with_prompt("請輸入照片資料夾路徑")
                .interact_text()?;
            return Ok(Some(path.trim().to_string()));
        }

        // 建立選項清單：歷史路徑 + 輸入新路徑
        let mut options: Vec<String> = recent_paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let exists = Path::new(p).exists();
                let indicator = if exists { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push("輸入新路徑...".to_string());

        println!("{}", style("(按 ESC 返回主選單)").dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇路徑")
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
            Some(_) => {
                let path: String = Input::new()
                    .with_prompt("請輸入照片資料夾路徑")
                    .interact_text()?;
                Ok(Some(path.trim().to_string()))
            }
        }
    }

    fn prompt_threshold(&self) -> Result<Option<f64>> {
        let items: Vec<String> = THRESHOLD_OPTIONS.iter().map(|t| format!("{t}")).collect();

        let default_index = THRESHOLD_OPTIONS
            .iter()
            .position(|&t| t == self.config.settings.default_threshold)
            .unwrap_or(0);

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇模糊閾值（分數低於此值的照片會被移走）")
            .items(&items)
            .default(default_index)
            .interact_opt()?;

        Ok(selection.map(|idx| THRESHOLD_OPTIONS[idx]))
    }

    fn print_summary(&self, run_config: &RunConfig, report: &BatchReport) {
        println!();
        println!("{}", style("=== 整理結果 ===").cyan().bold());
        println!("  找到影像: {} 張", report.discovered);
        println!("  已評分: {} 張", style(report.scored).green());
        println!(
            "  移到模糊資料夾: {} 張 ({})",
            style(report.moved).cyan(),
            segregation_folder(&run_config.folder, run_config.threshold).display()
        );

        if report.skipped > 0 {
            println!("  非 3 通道略過: {} 張", style(report.skipped).yellow());
        }

        if report.failed > 0 {
            println!("  失敗: {} 張", style(report.failed).red());
        }

        if report.interrupted {
            println!("{}", style("  處理被中斷，整批結果文件未寫入").yellow());
        } else if let Some(path) = &report.results_path {
            println!("  結果文件: {}", path.display());
        }

        info!(
            "模糊整理完成 - 評分: {}, 移動: {}, 略過: {}, 失敗: {}",
            report.scored, report.moved, report.skipped, report.failed
        );
    }
}
