use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{app_dirs::AppDirs, quiz::QuestionCount};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub question_count: QuestionCount,
    /// Unset means wait for the service as long as it takes
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            question_count: QuestionCount::default(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE_NAME),
            |dir| dir.join(CONFIG_FILE_NAME),
        );
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!("ignoring unreadable {}: {}", self.path.display(), e),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            server_url: "https://quiz.example.org".into(),
            question_count: QuestionCount::Fifteen,
            request_timeout_secs: Some(120),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn default_store_lives_in_config_dir() {
        let store = FileConfigStore::new();
        assert_eq!(store.path().file_name().unwrap(), CONFIG_FILE_NAME);
        if let Some(dir) = AppDirs::config_dir() {
            assert_eq!(store.path().parent(), Some(dir.as_path()));
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
        assert_eq!(store.load().request_timeout(), None);
    }

    #[test]
    fn corrupt_or_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());

        fs::write(&path, br#"{ "question_count": 10 }"#).unwrap();
        let cfg = store.load();
        assert_eq!(cfg.question_count, QuestionCount::Ten);
        assert_eq!(cfg.server_url, DEFAULT_SERVER_URL);

        // an unsupported count spoils the whole file
        fs::write(&path, br#"{ "question_count": 7 }"#).unwrap();
        assert_eq!(store.load(), Config::default());
    }
}
