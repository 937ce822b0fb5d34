use crate::config::save::save_settings;
use crate::config::{Config, THRESHOLD_OPTIONS};
use crate::menu::handlers::run_blur_sorter;
use anyhow::Result;
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 模糊照片整理系統 ===").cyan().bold());
    println!("{}", style("(按 ESC 離開)").dim());

    let options = vec!["整理模糊照片", "設定", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_blur_sorter(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單：調整預設閾值
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style("=== 設定 ===").cyan().bold());
    println!("{}", style("(按 ESC 返回)").dim());
    println!(
        "\n{} {}",
        style("目前預設閾值:").dim(),
        config.settings.default_threshold
    );
    println!();

    let items: Vec<String> = THRESHOLD_OPTIONS.iter().map(|t| format!("{t}")).collect();

    let default_index = THRESHOLD_OPTIONS
        .iter()
        .position(|&t| t == config.settings.default_threshold)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇預設閾值")
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    config.settings.default_threshold = THRESHOLD_OPTIONS[selection];
    save_settings(&config.settings)?;

    println!(
        "{}",
        style(format!(
            "預設閾值已更新為 {}",
            config.settings.default_threshold
        ))
        .green()
    );

    Ok(())
}
