use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "note2quiz";

/// Where note2quiz keeps its files. Callers pick the file names.
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// `~/.local/state/note2quiz`, or the platform's local data dir without a `$HOME`
    pub fn state_dir() -> Option<PathBuf> {
        Self::state_dir_in(std::env::var_os("HOME").as_deref().map(Path::new))
    }

    fn state_dir_in(home: Option<&Path>) -> Option<PathBuf> {
        match home {
            Some(home) if !home.as_os_str().is_empty() => {
                Some(home.join(".local").join("state").join(APP_NAME))
            }
            _ => Self::project().map(|pd| pd.data_local_dir().to_path_buf()),
        }
    }

    /// Platform config dir, e.g. `~/.config/note2quiz`
    pub fn config_dir() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().to_path_buf())
    }
}
