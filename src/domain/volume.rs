use std::{
    collections::BTreeMap,
    fmt, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;

use crate::domain::{Config, MokuroData};

/// A file belonging to a volume: a page image or the metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFile {
    path: PathBuf,
    len: u64,
}

impl VolumeFile {
    /// Create a handle to the file at `path`, `len` bytes long.
    #[must_use]
    pub const fn new(path: PathBuf, len: u64) -> Self {
        Self { path, len }
    }

    /// Where the file lives on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file in bytes, as observed when the volume was loaded.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Whether the file was empty when the volume was loaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the full contents of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can no longer be read.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// One logical book.
///
/// A volume pairs its decoded metadata document with the collection it belongs
/// to and the files it was loaded from.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_field_names)]
pub struct Volume {
    /// The decoded metadata document.
    pub mokuro_data: MokuroData,
    /// Name of the collection (series directory) the volume came from.
    pub volume_name: String,
    /// The volume's files, keyed by name.
    ///
    /// Page images are keyed by their path relative to the image directory,
    /// which is how [`crate::Page::img_path`] refers to them.
    pub files: BTreeMap<String, VolumeFile>,
}

impl Volume {
    /// Assemble a volume from its parts.
    #[must_use]
    pub const fn new(
        mokuro_data: MokuroData,
        volume_name: String,
        files: BTreeMap<String, VolumeFile>,
    ) -> Self {
        Self {
            mokuro_data,
            volume_name,
            files,
        }
    }

    /// The metadata document's own entry in [`Volume::files`], if present.
    #[must_use]
    pub fn metadata_file(&self) -> Option<(&str, &VolumeFile)> {
        self.files
            .iter()
            .find(|(name, _)| {
                Path::new(name)
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mokuro"))
            })
            .map(|(name, file)| (name.as_str(), file))
    }

    /// Every consistency problem in the volume.
    ///
    /// This includes the problems of the metadata document itself. Missing page
    /// images are only reported when [`Config::require_images`] is set.
    #[must_use]
    pub fn issues(&self, config: &Config) -> Vec<Issue> {
        let mut issues = self.mokuro_data.issues();

        if config.require_images {
            issues.extend(
                self.mokuro_data
                    .pages
                    .iter()
                    .enumerate()
                    .filter(|(_, page)| !self.files.contains_key(&page.img_path))
                    .map(|(index, page)| Issue::MissingImage {
                        page: index,
                        img_path: page.img_path.clone(),
                    }),
            );
        }

        issues
    }

    /// Check the volume for consistency problems.
    ///
    /// # Errors
    ///
    /// Returns every problem found by [`Volume::issues`].
    pub fn validate(&self, config: &Config) -> Result<(), ValidationError> {
        NonEmpty::from_vec(self.issues(config)).map_or(Ok(()), |issues| {
            Err(ValidationError {
                volume: self.mokuro_data.volume.clone(),
                issues,
            })
        })
    }
}

/// A consistency problem in a volume.
///
/// Page indices are zero-based positions in [`MokuroData::pages`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Issue {
    /// A page image has a zero width or height.
    #[error("page {page} ({img_path}) has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Index of the page.
        page: usize,
        /// The page's image path.
        img_path: String,
        /// Recorded width.
        width: u32,
        /// Recorded height.
        height: u32,
    },
    /// A page refers to an image that is not among the volume's files.
    #[error("page {page} refers to missing image {img_path}")]
    MissingImage {
        /// Index of the page.
        page: usize,
        /// The unresolved image path.
        img_path: String,
    },
}

impl Issue {
    /// Index of the page the issue concerns.
    #[must_use]
    pub const fn page(&self) -> usize {
        match self {
            Self::InvalidDimensions { page, .. } | Self::MissingImage { page, .. } => *page,
        }
    }
}

/// A volume failed validation.
#[derive(Debug, thiserror::Error)]
pub struct ValidationError {
    volume: String,
    issues: NonEmpty<Issue>,
}

impl ValidationError {
    /// The problems that were found.
    #[must_use]
    pub const fn issues(&self) -> &NonEmpty<Issue> {
        &self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "volume '{}' is inconsistent: ", self.volume)?;

        let total = self.issues.len();

        let displayed: Vec<String> = self
            .issues
            .iter()
            .take(MAX_DISPLAY)
            .map(ToString::to_string)
            .collect();

        let msg = displayed.join("; ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}
