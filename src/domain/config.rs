use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for loading a library of volumes.
///
/// This struct holds settings that control which files belong to a volume and
/// how strictly volumes are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File extensions recognised as page images.
    ///
    /// Extensions are stored lowercase and without a leading dot.
    image_extensions: Vec<String>,

    /// Whether every page must have a matching image file in its volume.
    pub require_images: bool,

    /// Whether a library may contain `.mokuro` files that cannot be loaded.
    ///
    /// When `true`, such files are skipped with a warning. When `false`
    /// (default), opening the library fails.
    pub allow_invalid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            require_images: true,
            allow_invalid: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the recognised image extensions.
    #[must_use]
    pub fn image_extensions(&self) -> &[String] {
        &self.image_extensions
    }

    /// Adds an image extension.
    ///
    /// The extension is normalized to lowercase with any leading dot removed.
    ///
    /// Returns `true` if the extension was added, `false` if it already
    /// existed.
    pub fn add_image_extension(&mut self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        if self.image_extensions.contains(&extension) {
            false
        } else {
            self.image_extensions.push(extension);
            true
        }
    }

    /// Checks whether the file at `path` is a page image.
    ///
    /// The comparison is case-insensitive.
    #[must_use]
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.image_extensions.iter().any(|known| *known == ext)
            })
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp", "avif", "gif", "bmp"]
        .into_iter()
        .map(String::from)
        .collect()
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_image_extensions")]
        image_extensions: Vec<String>,

        #[serde(default = "default_true")]
        require_images: bool,

        #[serde(default)]
        allow_invalid: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                image_extensions,
                require_images,
                allow_invalid,
            } => Self {
                image_extensions: image_extensions
                    .iter()
                    .map(|ext| normalize_extension(ext))
                    .collect(),
                require_images,
                allow_invalid,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            image_extensions: config.image_extensions,
            require_images: config.require_images,
            allow_invalid: config.allow_invalid,
        }
    }
}
