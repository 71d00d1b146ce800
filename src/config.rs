use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::{ScoringRule, SessionConfig, DEFAULT_TIME_LIMIT_SECS};
use crate::words::WordSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub word_set: WordSet,
    pub time_limit_secs: u32,
    pub scoring: ScoringRule,
    pub photos_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_set: WordSet::General,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            scoring: ScoringRule::EveryMatch,
            photos_dir: None,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            time_limit_secs: self.time_limit_secs,
            scoring: self.scoring,
        }
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.photos_dir
            .clone()
            .unwrap_or_else(AppDirs::default_photos_dir)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("photorush_config.json"));
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
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
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
            word_set: WordSet::Demo,
            time_limit_secs: 60,
            scoring: ScoringRule::NewMatchOnly,
            photos_dir: Some(PathBuf::from("/tmp/album")),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "word_set": "demo", "scoring": "new-match-only" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.word_set, WordSet::Demo);
        assert_eq!(cfg.scoring, ScoringRule::NewMatchOnly);
        assert_eq!(cfg.time_limit_secs, 300);
        assert_eq!(cfg.photos_dir, None);
    }

    #[test]
    fn session_config_carries_game_rules() {
        let cfg = Config {
            time_limit_secs: 90,
            scoring: ScoringRule::NewMatchOnly,
            ..Config::default()
        };
        let session = cfg.session_config();
        assert_eq!(session.time_limit_secs, 90);
        assert_eq!(session.scoring, ScoringRule::NewMatchOnly);
    }
}
