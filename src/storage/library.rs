//! A filesystem backed library of volumes
//!
//! The [`Library`] loads every `.mokuro` document below a root directory,
//! together with the page images stored next to each one.

use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::{
    domain::{Config, Volume},
    storage::VolumeLoadError,
};

/// The name of the configuration file in the library root.
pub const CONFIG_FILE: &str = "mokuro.toml";

/// A directory tree of volumes.
#[derive(Debug)]
pub struct Library {
    /// The root of the directory volumes are stored in.
    root: PathBuf,
    config: Config,
    volumes: Vec<Volume>,
}

impl Library {
    /// Load every volume below `root`.
    ///
    /// Volumes are ordered by the path of their metadata document.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory. The behaviour for
    /// documents that fail to load depends on the configuration file in the
    /// root. If `allow_invalid` is `true`, they are skipped with a warning.
    /// If it is `false` (the default), every failure is collected and
    /// returned.
    pub fn open(root: PathBuf) -> Result<Self, LibraryLoadError> {
        if !root.is_dir() {
            return Err(LibraryLoadError::NotADirectory(root));
        }

        let config = load_config(&root);
        let paths = collect_mokuro_paths(&root);

        let (volumes, failures): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| Volume::load(path, &config))
            .partition(Result::is_ok);

        let volumes: Vec<_> = volumes.into_iter().filter_map(Result::ok).collect();
        let failures: Vec<_> = failures.into_iter().filter_map(Result::err).collect();

        if config.allow_invalid {
            for failure in &failures {
                tracing::warn!("Skipping volume: {failure}");
            }
        } else if let Some(failures) = NonEmpty::from_vec(failures) {
            return Err(LibraryLoadError::InvalidVolumes(failures));
        }

        tracing::info!("Loaded {} volumes from {}", volumes.len(), root.display());

        Ok(Self {
            root,
            config,
            volumes,
        })
    }

    /// The root directory of the library.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration the library was loaded with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// All loaded volumes.
    #[must_use]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Find a volume by identifier, label or metadata file stem.
    ///
    /// The file stem is the name of the metadata document without its
    /// extension. The identifier is tried first across all volumes, so a label that
    /// happens to equal another volume's identifier cannot shadow it.
    #[must_use]
    pub fn find(&self, query: &str) -> Option<&Volume> {
        self.volumes
            .iter()
            .find(|volume| volume.mokuro_data.volume_uuid == query)
            .or_else(|| {
                self.volumes.iter().find(|volume| {
                    volume.mokuro_data.volume == query
                        || volume
                            .metadata_file()
                            .and_then(|(name, _)| Path::new(name).file_stem())
                            == Some(OsStr::new(query))
                })
            })
    }
}

/// A library could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum LibraryLoadError {
    /// The root path is not a directory.
    NotADirectory(PathBuf),
    /// One or more volumes could not be loaded.
    InvalidVolumes(NonEmpty<VolumeLoadError>),
}

impl fmt::Display for LibraryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        match self {
            Self::NotADirectory(path) => write!(f, "not a directory: {}", path.display()),
            Self::InvalidVolumes(failures) => {
                write!(f, "failed to load volumes: ")?;

                let total = failures.len();

                let displayed_paths: Vec<String> = failures
                    .iter()
                    .take(MAX_DISPLAY)
                    .map(|e| e.path().display().to_string())
                    .collect();

                let msg = displayed_paths.join(", ");

                if total <= MAX_DISPLAY {
                    write!(f, "{msg}")
                } else {
                    write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
                }
            }
        }
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Config::default();
    }

    Config::load(&path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring {}: {e}", path.display());
        Config::default()
    })
}

fn collect_mokuro_paths(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| tracing::warn!("Skipping unreadable entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("mokuro")))
        .map(walkdir::DirEntry::into_path)
        .collect()
}
