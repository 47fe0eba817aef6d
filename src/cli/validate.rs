use std::path::PathBuf;

use clap::Parser;
use mokuro::{Issue, Library, Volume};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Check every volume in the library for consistency problems")]
pub struct Validate {
    /// Do not require an image file for every page
    #[arg(long)]
    skip_images: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

/// The issues found in one volume.
struct VolumeReport<'a> {
    volume: &'a Volume,
    issues: Vec<Issue>,
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let library = Library::open(root)?;
        let reports = self.reports(&library);

        let total: usize = reports.iter().map(|report| report.issues.len()).sum();
        tracing::debug!(
            "Validated {} volumes, {total} issues",
            library.volumes().len()
        );

        if !self.quiet {
            match self.output {
                OutputFormat::Table => Self::output_table(&reports, total),
                OutputFormat::Json => Self::output_json(&reports, total)?,
                OutputFormat::Summary => println!("issues={total}"),
            }
        }

        // Exit with appropriate code
        if total > 0 {
            std::process::exit(2);
        }

        Ok(())
    }

    fn reports<'a>(&self, library: &'a Library) -> Vec<VolumeReport<'a>> {
        let mut config = library.config().clone();
        if self.skip_images {
            config.require_images = false;
        }

        library
            .volumes()
            .iter()
            .map(|volume| VolumeReport {
                volume,
                issues: volume.issues(&config),
            })
            .collect()
    }

    fn output_table(reports: &[VolumeReport<'_>], total: usize) {
        println!("Validating {} volumes...\n", reports.len());

        for report in reports {
            let data = &report.volume.mokuro_data;
            if report.issues.is_empty() {
                println!(
                    "✓ {} / {}: {} pages, all valid",
                    report.volume.volume_name,
                    data.volume,
                    data.pages.len()
                );
                continue;
            }

            println!(
                "{}",
                format!(
                    "✗ {} / {}: {} issues found",
                    report.volume.volume_name,
                    data.volume,
                    report.issues.len()
                )
                .warning()
            );
            for issue in &report.issues {
                println!("    • {issue}");
            }
        }

        if total == 0 {
            println!("\n{}", "Library is healthy (0 issues)".success());
        } else {
            println!("\n{}", format!("Summary: {total} issues found").warning());
            if reports
                .iter()
                .flat_map(|report| &report.issues)
                .any(|issue| matches!(issue, Issue::MissingImage { .. }))
            {
                println!(
                    "{}",
                    "Run 'mokuro-vol validate --skip-images' to check metadata only".dim()
                );
            }
        }
    }

    fn output_json(reports: &[VolumeReport<'_>], total: usize) -> anyhow::Result<()> {
        use serde_json::json;

        let volumes: Vec<_> = reports
            .iter()
            .map(|report| {
                let issues: Vec<_> = report
                    .issues
                    .iter()
                    .map(|issue| match issue {
                        Issue::InvalidDimensions {
                            page,
                            img_path,
                            width,
                            height,
                        } => json!({
                            "kind": "invalid_dimensions",
                            "page": page,
                            "img_path": img_path,
                            "width": width,
                            "height": height,
                        }),
                        Issue::MissingImage { page, img_path } => json!({
                            "kind": "missing_image",
                            "page": page,
                            "img_path": img_path,
                        }),
                    })
                    .collect();

                json!({
                    "collection": report.volume.volume_name,
                    "volume": report.volume.mokuro_data.volume,
                    "volume_uuid": report.volume.mokuro_data.volume_uuid,
                    "issues": issues,
                })
            })
            .collect();

        let output = json!({
            "status": if total == 0 { "healthy" } else { "issues_found" },
            "volumes": volumes,
            "summary": {
                "volumes": reports.len(),
                "total_issues": total,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
