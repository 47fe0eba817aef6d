use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use mokuro::Library;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Write a volume's metadata document to stdout")]
pub struct Export {
    /// The volume to export: its UUID, its label or its file name
    volume: String,

    /// Indent the output
    #[arg(long)]
    pretty: bool,
}

impl Export {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let library = Library::open(root)?;

        let mut stdout = io::stdout().lock();
        self.write_to(&library, &mut stdout)?;
        stdout.flush()?;

        Ok(())
    }

    fn write_to<W: Write>(&self, library: &Library, writer: &mut W) -> anyhow::Result<()> {
        let volume = super::find_volume(library, &self.volume)?;
        let data = &volume.mokuro_data;

        if self.pretty {
            writeln!(writer, "{}", data.to_json_pretty()?)?;
        } else {
            data.write(&mut *writer)?;
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mokuro::MokuroData;
    use tempfile::tempdir;
    use test_case::test_case;

    use super::*;
    use crate::cli::write_library;

    #[test_case(false; "compact")]
    #[test_case(true; "pretty")]
    fn exported_document_decodes_to_the_loaded_one(pretty: bool) {
        let tmp = tempdir().unwrap();
        write_library(tmp.path());
        let library = Library::open(tmp.path().to_path_buf()).unwrap();

        let export = Export {
            volume: "Vol 01".to_string(),
            pretty,
        };
        let mut output = Vec::new();
        export.write_to(&library, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count() > 1, pretty);

        let decoded = MokuroData::from_json(&output).unwrap();
        assert_eq!(decoded, library.volumes()[0].mokuro_data);
    }

    #[test]
    fn unknown_volume_is_an_error() {
        let tmp = tempdir().unwrap();
        write_library(tmp.path());

        let export = Export {
            volume: "Vol 99".to_string(),
            pretty: false,
        };
        let error = export.run(tmp.path().to_path_buf()).unwrap_err();

        assert_eq!(error.to_string(), "Volume 'Vol 99' not found");
    }
}
