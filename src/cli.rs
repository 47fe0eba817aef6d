use std::path::PathBuf;

mod config;
mod export;
mod list;
mod show;
mod terminal;
mod validate;

use clap::ArgAction;
use export::Export;
use list::List;
use mokuro::{Library, Volume};
use show::Show;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the volume library
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List the volumes in the library (default)
    List(List),

    /// Show a volume's metadata, or the annotated text of one page
    Show(Show),

    /// Check every volume for consistency problems
    Validate(Validate),

    /// Write a volume's metadata document to stdout
    Export(Export),

    /// Show or modify the library configuration
    Config(config::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Validate(command) => command.run(root)?,
            Self::Export(command) => command.run(root)?,
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

/// Look up a volume by identifier, label or file name, or fail with a
/// message naming the query.
fn find_volume<'a>(library: &'a Library, query: &str) -> anyhow::Result<&'a Volume> {
    library
        .find(query)
        .ok_or_else(|| anyhow::anyhow!("Volume '{query}' not found"))
}

/// Write a library with one collection and one two-page volume below `root`.
///
/// Only the first page has an image.
#[cfg(test)]
fn write_library(root: &std::path::Path) {
    let collection = root.join("Series");
    std::fs::create_dir_all(collection.join("Vol 01")).unwrap();
    std::fs::write(collection.join("Vol 01/001.jpg"), b"jpeg").unwrap();
    std::fs::write(
        collection.join("Vol 01.mokuro"),
        r#"{
            "version": "0.2.1",
            "title": "Series",
            "title_uuid": "series-uuid",
            "volume": "Vol 01",
            "volume_uuid": "vol-01-uuid",
            "pages": [
                {
                    "version": "0.2.1",
                    "img_width": 1600,
                    "img_height": 2400,
                    "img_path": "001.jpg",
                    "blocks": [{
                        "box": [10, 20, 110.5, 220],
                        "vertical": true,
                        "font_size": 28,
                        "lines": ["猫がいる"],
                        "translation": "There is a cat",
                        "line_translations": [{"words": [{
                            "word": "猫",
                            "dictionary_entry": "猫",
                            "meaning": "cat",
                            "sentence_form": "noun"
                        }]}]
                    }]
                },
                {
                    "version": "0.2.1",
                    "img_width": 1600,
                    "img_height": 2400,
                    "img_path": "002.jpg",
                    "blocks": []
                }
            ]
        }"#,
    )
    .unwrap();
}
