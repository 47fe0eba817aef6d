use std::path::Path;

use mokuro::{Config, storage::library::CONFIG_FILE};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
/// Show or modify library configuration
///
/// Configuration is stored in mokuro.toml in the library root. A library
/// without one uses the defaults.
///
/// Available configuration keys:
///   `image_extensions`  File extensions recognised as page images
///   `require_images`    Report pages without an image file (default: true)
///   `allow_invalid`     Skip volumes that fail to load (default: false)
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key to retrieve
        key: String,
    },

    /// Set a configuration value
    ///
    /// Examples:
    ///   mokuro-vol config set `require_images` false
    ///   mokuro-vol config set `allow_invalid` true
    Set {
        /// Configuration key to set
        ///
        /// Settable keys: `require_images`, `allow_invalid`
        key: String,

        /// Value to set
        value: String,
    },

    /// Recognise another file extension as a page image
    AddExtension {
        /// The extension, with or without a leading dot
        extension: String,
    },
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);

        match self.command {
            ConfigCommand::Show => Self::show_config(&config_path),
            ConfigCommand::Get { key } => Self::get_config(&config_path, &key),
            ConfigCommand::Set { key, value } => Self::set_config(&config_path, &key, &value),
            ConfigCommand::AddExtension { extension } => {
                Self::add_extension(&config_path, &extension)
            }
        }
    }

    fn load(config_path: &Path) -> anyhow::Result<Config> {
        if config_path.exists() {
            Config::load(config_path).map_err(|e| anyhow::anyhow!("{e}"))
        } else {
            Ok(Config::default())
        }
    }

    fn show_config(config_path: &Path) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        println!("Configuration:");
        println!(
            "  image_extensions: {}",
            config.image_extensions().join(", ")
        );
        println!("  require_images: {}", config.require_images);
        println!(
            "  allow_invalid: {} ({})",
            config.allow_invalid,
            if config.allow_invalid {
                "invalid volumes are skipped".dim()
            } else {
                "invalid volumes are an error".dim()
            }
        );
        Ok(())
    }

    fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        match key {
            "image_extensions" => {
                for extension in config.image_extensions() {
                    println!("{extension}");
                }
            }
            "require_images" => println!("{}", config.require_images),
            "allow_invalid" => println!("{}", config.allow_invalid),
            _ => {
                anyhow::bail!(
                    "Unknown configuration key: '{key}'\n\nAvailable keys:\n  \
                     image_extensions\n  require_images\n  allow_invalid",
                );
            }
        }
        Ok(())
    }

    fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
        let mut config = Self::load(config_path)?;

        let bool_value = || {
            value
                .parse::<bool>()
                .map_err(|_| anyhow::anyhow!("Value must be 'true' or 'false'"))
        };

        match key {
            "require_images" => config.require_images = bool_value()?,
            "allow_invalid" => config.allow_invalid = bool_value()?,
            "image_extensions" => {
                anyhow::bail!("Use 'mokuro-vol config add-extension' to add image extensions")
            }
            _ => {
                anyhow::bail!(
                    "Unknown configuration key: '{key}'\nSupported keys: require_images, \
                     allow_invalid",
                );
            }
        }

        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        println!("{}", format!("Set {key} = {value}").success());
        Ok(())
    }

    fn add_extension(config_path: &Path, extension: &str) -> anyhow::Result<()> {
        if extension.trim_start_matches('.').is_empty() {
            anyhow::bail!("Image extension must not be empty");
        }

        let mut config = Self::load(config_path)?;

        if config.add_image_extension(extension) {
            config
                .save(config_path)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!(
                "{}",
                format!("Added image extension '{extension}'").success()
            );
        } else {
            println!(
                "{}",
                format!("'{extension}' is already an image extension").dim()
            );
        }
        Ok(())
    }
}
