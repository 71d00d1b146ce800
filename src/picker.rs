use image::io::Reader as ImageReader;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use thiserror::Error;

use crate::runtime::GameEvent;

const PHOTO_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("couldn't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("couldn't decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// A decoded photo together with where it came from
#[derive(Debug, Clone)]
pub struct Photo {
    pub path: PathBuf,
    pub image: DynamicImage,
}

impl Photo {
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    pub fn load(path: &Path) -> Result<Self, PhotoError> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| PhotoError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let image = reader.decode().map_err(|source| PhotoError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, image))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            PHOTO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// The player's photo album: image files directly inside one directory
#[derive(Debug, Clone)]
pub struct PhotoLibrary {
    root: PathBuf,
}

impl PhotoLibrary {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted photo paths. An unreadable directory is an empty album.
    pub fn scan(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("couldn't list photos in {}: {e}", self.root.display());
                return Vec::new();
            }
        };

        let mut photos: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_photo(path))
            .collect();
        photos.sort();
        photos
    }
}

/// Selection state of the in-terminal photo picker
#[derive(Debug, Clone, Default)]
pub struct PhotoBrowser {
    pub entries: Vec<PathBuf>,
    pub selected: usize,
}

impl PhotoBrowser {
    pub fn open(library: &PhotoLibrary) -> Self {
        Self {
            entries: library.scan(),
            selected: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn current(&self) -> Option<&Path> {
        self.entries.get(self.selected).map(PathBuf::as_path)
    }
}

/// Decodes `path` off the UI thread and posts the outcome as
/// [`GameEvent::Picked`], tagged with the countdown `generation` the pick
/// belongs to. A photo that fails to load is reported as `None`.
pub fn spawn_load(
    path: PathBuf,
    generation: u64,
    tx: Sender<GameEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let photo = match Photo::load(&path) {
            Ok(photo) => Some(photo),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        };
        let _ = tx.send(GameEvent::Picked(generation, photo));
    })
}
