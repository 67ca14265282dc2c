use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

pub const LOG_FILE_NAME: &str = "note2quiz.log";

/// Log file used when none is given on the command line
pub fn default_path() -> Option<PathBuf> {
    AppDirs::state_dir().map(|dir| dir.join(LOG_FILE_NAME))
}

/// Send `tracing` output to `path`, appending. The terminal belongs to the
/// UI, so nothing is ever written to stdout/stderr.
///
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}
