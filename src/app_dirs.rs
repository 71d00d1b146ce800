use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "photorush").map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("photorush");
            Some(state_dir.join("photorush.log"))
        } else {
            ProjectDirs::from("", "", "photorush")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("photorush.log"))
        }
    }

    /// The player's picture folder, falling back to the working directory
    pub fn default_photos_dir() -> PathBuf {
        UserDirs::new()
            .and_then(|dirs| dirs.picture_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
