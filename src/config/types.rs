use serde::{Deserialize, Serialize};

/// 路徑歷史上限
pub const MAX_RECENT_PATHS: usize = 10;

/// 可選的模糊分數閾值（拉普拉斯響應變異數）
pub const THRESHOLD_OPTIONS: [f64; 10] = [
    5.0, 10.0, 20.0, 40.0, 50.0, 75.0, 100.0, 200.0, 400.0, 1000.0,
];

pub const DEFAULT_THRESHOLD: f64 = 100.0;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub recent_paths: Vec<String>,
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            recent_paths: Vec::new(),
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
}
