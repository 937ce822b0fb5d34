pub mod batch;
pub mod result_sink;

mod main;

pub use batch::{BatchReport, RunConfig, run_batch, segregation_folder};
pub use main::BlurSorter;
pub use result_sink::{RunResult, ScoreRecord};
