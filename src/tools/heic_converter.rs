use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// 外部轉檔工具的單項逾時上限
const CONVERT_TIMEOUT: Duration = Duration::from_secs(30);

/// 子程序狀態輪詢間隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("無法啟動轉檔工具: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("等待轉檔工具時發生錯誤: {0}")]
    Wait(#[source] std::io::Error),
    #[error("轉檔工具結束碼非零: {0}")]
    NonZeroExit(std::process::ExitStatus),
    #[error("轉檔逾時（超過 {0:?}）")]
    Timeout(Duration),
}

/// 專有影像格式的外部轉換能力
///
/// 把來源檔轉成 `dst` 指定的標準格式檔案。`dst` 的刪除由呼叫端負責。
pub trait HeicConverter {
    fn convert(&self, src: &Path, dst: &Path) -> Result<(), ConvertError>;
}

/// 以 macOS 的 sips 工具轉檔
pub struct SipsConverter {
    timeout: Duration,
}

impl SipsConverter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: CONVERT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn build_command(src: &Path, dst: &Path) -> Command {
        let mut cmd = Command::new("sips");
        cmd.args(["-s", "format", "jpeg"])
            .arg(src)
            .arg("--out")
            .arg(dst)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for SipsConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl HeicConverter for SipsConverter {
    fn convert(&self, src: &Path, dst: &Path) -> Result<(), ConvertError> {
        debug!("轉檔 {} -> {}", src.display(), dst.display());

        let mut child = Self::build_command(src, dst)
            .spawn()
            .map_err(ConvertError::Spawn)?;

        let started = Instant::now();
        loop {
            match child.try_wait().map_err(ConvertError::Wait)? {
                Some(status) if status.success() => return Ok(()),
                Some(status) => return Err(ConvertError::NonZeroExit(status)),
                None => {
                    if started.elapsed() >= self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ConvertError::Timeout(self.timeout));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }
}
