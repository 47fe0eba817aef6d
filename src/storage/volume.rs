// Loading a single volume from disk.
//
// A volume is stored as `<collection>/<name>.mokuro` with its page images in
// the sibling directory `<collection>/<name>/`.

use std::{
    collections::BTreeMap,
    io,
    path::{Component, Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
    domain::{Config, MokuroData, Volume, VolumeFile},
    storage::DecodeError,
};

/// A volume could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum VolumeLoadError {
    /// The metadata file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The metadata file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The metadata file could not be decoded.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// The metadata file.
        path: PathBuf,
        /// The underlying decoding error.
        source: DecodeError,
    },
}

impl VolumeLoadError {
    /// The metadata file that failed to load.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } => path,
        }
    }
}

impl Volume {
    /// Load the volume whose metadata document is at `path`.
    ///
    /// Page images are collected from the directory next to the document
    /// with the same name minus the `.mokuro` extension, and are keyed by their
    /// path relative to that directory. The document itself is keyed by its
    /// file name. A missing image directory is not an error; use
    /// [`Volume::validate`] to detect pages without images.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or decoded.
    pub fn load(path: &Path, config: &Config) -> Result<Self, VolumeLoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| VolumeLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mokuro_data =
            MokuroData::from_json(&json).map_err(|source| VolumeLoadError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        let volume_name = collection_name(path).unwrap_or_else(|| mokuro_data.title.clone());

        let mut files = collect_images(&path.with_extension(""), config);
        if let Some(name) = path.file_name() {
            files.insert(
                name.to_string_lossy().into_owned(),
                VolumeFile::new(path.to_path_buf(), json.len() as u64),
            );
        }

        tracing::debug!(
            "Loaded volume '{}' from {} ({} pages, {} files)",
            mokuro_data.volume,
            path.display(),
            mokuro_data.pages.len(),
            files.len()
        );

        Ok(Self::new(mokuro_data, volume_name, files))
    }
}

/// The name of the directory containing the metadata document.
fn collection_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
}

fn collect_images(dir: &Path, config: &Config) -> BTreeMap<String, VolumeFile> {
    if !dir.is_dir() {
        tracing::debug!("No image directory at {}", dir.display());
        return BTreeMap::new();
    }

    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| tracing::warn!("Skipping unreadable image entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file() && config.is_image(entry.path()))
        .filter_map(|entry| {
            let len = entry
                .metadata()
                .inspect_err(|e| {
                    tracing::debug!("Skipping unreadable file {}: {e}", entry.path().display());
                })
                .ok()?
                .len();
            let key = relative_key(entry.path(), dir)?;
            Some((key, VolumeFile::new(entry.into_path(), len)))
        })
        .collect()
}

/// The `/`-separated path of `path` relative to `dir`.
fn relative_key(path: &Path, dir: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const DOCUMENT: &str = r#"{
        "version": "0.2.1",
        "title": "Series",
        "title_uuid": "t-1",
        "volume": "Series 01",
        "volume_uuid": "v-1",
        "pages": [
            {"version": "0.2.1", "img_width": 800, "img_height": 1200, "img_path": "001.jpg", "blocks": []},
            {"version": "0.2.1", "img_width": 800, "img_height": 1200, "img_path": "extra/002.png", "blocks": []}
        ]
    }"#;

    fn write_volume(root: &Path) -> PathBuf {
        let collection = root.join("Series");
        let images = collection.join("Series 01");
        fs::create_dir_all(images.join("extra")).unwrap();
        fs::write(images.join("001.jpg"), b"jpeg").unwrap();
        fs::write(images.join("extra/002.png"), b"png!!").unwrap();
        fs::write(images.join("notes.txt"), b"not an image").unwrap();

        let path = collection.join("Series 01.mokuro");
        fs::write(&path, DOCUMENT).unwrap();
        path
    }

    #[test]
    fn load_collects_images_and_metadata() {
        let tmp = TempDir::new().unwrap();
        let path = write_volume(tmp.path());

        let volume = Volume::load(&path, &Config::default()).unwrap();

        assert_eq!(volume.volume_name, "Series");
        assert_eq!(volume.mokuro_data.volume, "Series 01");

        let names: Vec<_> = volume.files.keys().map(String::as_str).collect();
        assert_eq!(names, ["001.jpg", "Series 01.mokuro", "extra/002.png"]);
        assert_eq!(volume.files["extra/002.png"].len(), 5);
        assert_eq!(volume.files["001.jpg"].read().unwrap(), b"jpeg");
        assert_eq!(
            volume.metadata_file().unwrap().1.len(),
            DOCUMENT.len() as u64
        );

        assert!(volume.validate(&Config::default()).is_ok());
    }

    #[test]
    fn missing_image_directory_yields_metadata_only() {
        let tmp = TempDir::new().unwrap();
        let path = write_volume(tmp.path());
        fs::remove_dir_all(path.with_extension("")).unwrap();

        let volume = Volume::load(&path, &Config::default()).unwrap();

        assert_eq!(volume.files.len(), 1);
        assert_eq!(volume.issues(&Config::default()).len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_collected() {
        let tmp = TempDir::new().unwrap();
        let path = write_volume(tmp.path());
        let images = path.with_extension("");

        let shared = tmp.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("002.png"), b"png!!").unwrap();
        fs::remove_dir_all(images.join("extra")).unwrap();
        std::os::unix::fs::symlink(&shared, images.join("extra")).unwrap();

        fs::remove_file(images.join("001.jpg")).unwrap();
        fs::write(shared.join("001.jpg"), b"jpeg").unwrap();
        std::os::unix::fs::symlink(shared.join("001.jpg"), images.join("001.jpg")).unwrap();

        let volume = Volume::load(&path, &Config::default()).unwrap();

        assert_eq!(volume.files["001.jpg"].len(), 4);
        assert_eq!(volume.files["extra/002.png"].len(), 5);
        assert!(volume.issues(&Config::default()).is_empty());
    }

    #[test]
    fn missing_document_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.mokuro");

        let error = Volume::load(&path, &Config::default()).unwrap_err();
        assert!(matches!(error, VolumeLoadError::Io { .. }));
        assert_eq!(error.path(), path);
    }

    #[test]
    fn undecodable_document_is_a_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.mokuro");
        fs::write(&path, "{}").unwrap();

        let error = Volume::load(&path, &Config::default()).unwrap_err();
        assert!(matches!(
            error,
            VolumeLoadError::Decode {
                source: DecodeError::Malformed(_),
                ..
            }
        ));
    }

    #[test]
    fn relative_key_uses_forward_slashes() {
        let dir = Path::new("/library/Series/Series 01");
        let path = dir.join("chapter 1").join("001.jpg");

        assert_eq!(relative_key(&path, dir).unwrap(), "chapter 1/001.jpg");
        assert_eq!(relative_key(Path::new("/elsewhere/001.jpg"), dir), None);
    }
}
