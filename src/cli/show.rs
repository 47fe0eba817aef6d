use std::path::PathBuf;

use clap::Parser;
use mokuro::{Block, Library, Page, Volume};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Display a volume's metadata or the annotated text of one page")]
pub struct Show {
    /// The volume to display: its UUID, its label or its file name
    volume: String,

    /// Show the blocks of this page (1-based)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    page: Option<u32>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let library = Library::open(root)?;
        let volume = super::find_volume(&library, &self.volume)?;

        match self.page {
            Some(number) => {
                let pages = &volume.mokuro_data.pages;
                let Some(page) = usize::try_from(number - 1)
                    .ok()
                    .and_then(|index| pages.get(index))
                else {
                    anyhow::bail!(
                        "Page {number} out of range: '{}' has {} pages",
                        volume.mokuro_data.volume,
                        pages.len()
                    );
                };

                match self.output {
                    OutputFormat::Pretty => Self::output_page(number, page),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
                }
            }
            None => match self.output {
                OutputFormat::Pretty => Self::output_volume(volume),
                OutputFormat::Json => Self::output_volume_json(volume)?,
            },
        }

        Ok(())
    }

    fn output_volume(volume: &Volume) {
        let data = &volume.mokuro_data;

        println!("# {}", data.volume);
        println!("{}\n", data.title);

        println!("{}", "Metadata".dim());
        println!("  Collection:  {}", volume.volume_name);
        println!("  Title UUID:  {}", data.title_uuid);
        println!("  Volume UUID: {}", data.volume_uuid);
        println!("  Version:     {}", data.version);
        if let Some((_, file)) = volume.metadata_file() {
            println!("  Path:        {}", file.path().display());
        }

        println!("\n{}", "Pages".dim());
        for (index, page) in data.pages.iter().enumerate() {
            let marker = if volume.files.contains_key(&page.img_path) {
                ""
            } else {
                " ⚠️"
            };
            println!(
                "  {:>4}. {}  {}x{}  {} blocks{marker}",
                index + 1,
                page.img_path,
                page.img_width,
                page.img_height,
                page.blocks.len()
            );
        }
    }

    fn output_volume_json(volume: &Volume) -> anyhow::Result<()> {
        use serde_json::json;

        let data = &volume.mokuro_data;
        let pages: Vec<_> = data
            .pages
            .iter()
            .map(|page| {
                json!({
                    "img_path": page.img_path,
                    "img_width": page.img_width,
                    "img_height": page.img_height,
                    "blocks": page.blocks.len(),
                    "has_image": volume.files.contains_key(&page.img_path),
                })
            })
            .collect();

        let output = json!({
            "collection": volume.volume_name,
            "version": data.version,
            "title": data.title,
            "title_uuid": data.title_uuid,
            "volume": data.volume,
            "volume_uuid": data.volume_uuid,
            "files": volume.files.keys().collect::<Vec<_>>(),
            "pages": pages,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_page(number: u32, page: &Page) {
        println!(
            "# Page {number}  {}  {}x{}",
            page.img_path, page.img_width, page.img_height
        );

        if page.blocks.is_empty() {
            println!("\n{}", "No text detected".dim());
        }

        for (index, block) in page.blocks.iter().enumerate() {
            Self::output_block(index + 1, block);
        }
    }

    fn output_block(number: usize, block: &Block) {
        let [a, b, c, d] = block.bounding_box().values();
        let orientation = if block.vertical { "vertical" } else { "horizontal" };
        println!(
            "\n{}",
            format!(
                "Block {number} ({orientation}, font size {}, box [{a}, {b}, {c}, {d}])",
                block.font_size()
            )
            .dim()
        );

        for (line, translation) in block.iter_lines() {
            println!("  {line}");
            for word in &translation.words {
                println!(
                    "    {} {} {}",
                    word.word.info(),
                    format!("({}, {})", word.dictionary_entry, word.sentence_form).dim(),
                    word.meaning
                );
            }
        }

        if !block.translation.is_empty() {
            println!("  {} {}", "→".success(), block.translation);
        }
    }
}
