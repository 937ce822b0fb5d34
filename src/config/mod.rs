pub mod load;
pub mod save;
pub mod types;

pub use types::{Config, DEFAULT_THRESHOLD, MAX_RECENT_PATHS, THRESHOLD_OPTIONS, UserSettings};
