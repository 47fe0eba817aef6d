use std::path::PathBuf;

use clap::Parser;
use mokuro::Library;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, Parser)]
#[command(about = "List the volumes in the library")]
pub struct List {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let library = Library::open(root)?;

        match self.output {
            OutputFormat::Table => Self::output_table(&library),
            OutputFormat::Json => Self::output_json(&library)?,
        }

        Ok(())
    }

    fn output_table(library: &Library) {
        if library.volumes().is_empty() {
            println!(
                "{}",
                format!("No volumes found in {}", library.root().display()).dim()
            );
            return;
        }

        let mut current_collection = None;
        for volume in library.volumes() {
            if current_collection != Some(volume.volume_name.as_str()) {
                println!("{}", volume.volume_name.info());
                current_collection = Some(volume.volume_name.as_str());
            }

            let data = &volume.mokuro_data;
            println!(
                "  {}  {} pages, {} blocks  {}",
                data.volume,
                data.pages.len(),
                data.block_count(),
                data.volume_uuid.dim()
            );
        }
    }

    fn output_json(library: &Library) -> anyhow::Result<()> {
        use serde_json::json;

        let volumes: Vec<_> = library
            .volumes()
            .iter()
            .map(|volume| {
                let data = &volume.mokuro_data;
                json!({
                    "collection": volume.volume_name,
                    "title": data.title,
                    "title_uuid": data.title_uuid,
                    "volume": data.volume,
                    "volume_uuid": data.volume_uuid,
                    "pages": data.pages.len(),
                    "blocks": data.block_count(),
                    "files": volume.files.len(),
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&volumes)?);
        Ok(())
    }
}
