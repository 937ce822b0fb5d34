use crate::component::BlurSorter;
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_blur_sorter(term: &Term, shutdown_signal: &Arc<AtomicBool>, config: &Config) -> Result<()> {
    let sorter = BlurSorter::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = sorter.run() {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}
