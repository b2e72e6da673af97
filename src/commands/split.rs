use std::{num::NonZeroU32, path::PathBuf};

use clap::Args;

use super::CommandError;
use crate::{
    image_util::OutputFormat,
    naming::{Axis, NameTable},
    split::{self, CellOutcome, OrganizeBy, SplitReport, SplitSettings},
};

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// The spritesheet image to split.
    pub source: PathBuf,

    /// Prefix for the frame file names. Defaults to the source file stem.
    pub prefix: Option<String>,

    /// Number of columns in the sheet.
    #[clap(short, long)]
    pub cols: NonZeroU32,

    /// Number of rows in the sheet.
    #[clap(short, long)]
    pub rows: NonZeroU32,

    /// Output folder.
    #[clap(short, long, default_value = "sprites")]
    pub output: PathBuf,

    /// Number assigned to the first saved frame.
    #[clap(short, long, default_value_t = 0)]
    pub start: u32,

    /// Output format for the frames.
    #[clap(short, long, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Keep fully transparent frames instead of skipping them.
    #[clap(short, long, action)]
    pub keep_empty: bool,

    /// Organize frames into subfolders.
    #[clap(long, default_value_t = OrganizeBy::None)]
    pub organize_by: OrganizeBy,

    /// Custom folder names for the rows, comma separated.
    /// Must have exactly one name per row.
    #[clap(long, value_delimiter = ',', verbatim_doc_comment)]
    pub row_names: Vec<String>,

    /// Custom folder names for the columns, comma separated.
    /// Must have exactly one name per column.
    #[clap(long, value_delimiter = ',', verbatim_doc_comment)]
    pub col_names: Vec<String>,
}

impl SplitArgs {
    fn prefix(&self) -> String {
        self.prefix.clone().unwrap_or_else(|| {
            self.source
                .file_stem()
                .map_or_else(|| "frame".to_owned(), |s| s.to_string_lossy().to_string())
        })
    }

    fn to_settings(&self) -> Result<SplitSettings, CommandError> {
        let cols = self.cols.get();
        let rows = self.rows.get();

        let row_names = if self.row_names.is_empty() {
            None
        } else {
            Some(NameTable::new(&self.row_names, rows as usize, Axis::Row)?)
        };

        let col_names = if self.col_names.is_empty() {
            None
        } else {
            Some(NameTable::new(&self.col_names, cols as usize, Axis::Column)?)
        };

        Ok(SplitSettings {
            cols,
            rows,
            prefix: self.prefix(),
            start_number: self.start,
            format: self.format,
            remove_empty: !self.keep_empty,
            organize_by: self.organize_by,
            row_names,
            col_names,
        })
    }
}

pub fn split(args: &SplitArgs) -> Result<(), CommandError> {
    let settings = args.to_settings()?;
    let report = split::split_sheet(&args.source, &args.output, &settings)?;
    log_report(&report);

    Ok(())
}

pub(super) fn log_report(report: &SplitReport) {
    info!(
        "sheet {}x{}, {} cells of {}x{}",
        report.sheet_width,
        report.sheet_height,
        report.total_cells,
        report.frame_width,
        report.frame_height
    );

    for cell in &report.cells {
        match &cell.outcome {
            CellOutcome::Written(path) => info!("saved {}", path.display()),
            CellOutcome::SkippedEmpty => {
                info!("cell ({}, {}) is empty, skipped", cell.row, cell.col);
            }
        }
    }

    info!(
        "done: {} frames saved, {} empty frames skipped",
        report.saved, report.skipped_empty
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(source: &str) -> SplitArgs {
        SplitArgs {
            source: PathBuf::from(source),
            prefix: None,
            cols: NonZeroU32::new(2).unwrap(),
            rows: NonZeroU32::new(1).unwrap(),
            output: PathBuf::from("sprites"),
            start: 0,
            format: OutputFormat::Png,
            keep_empty: false,
            organize_by: OrganizeBy::None,
            row_names: Vec::new(),
            col_names: Vec::new(),
        }
    }

    #[test]
    fn prefix_defaults_to_source_stem() {
        let settings = args("assets/player_walk.png").to_settings().unwrap();
        assert_eq!(settings.prefix, "player_walk");
    }

    #[test]
    fn explicit_prefix_wins() {
        let mut args = args("assets/player_walk.png");
        args.prefix = Some("walk".to_owned());
        assert_eq!(args.to_settings().unwrap().prefix, "walk");
    }

    #[test]
    fn name_tables_are_validated_against_the_grid() {
        let mut args = args("sheet.png");
        args.col_names = vec!["left".to_owned(), "mid".to_owned(), "right".to_owned()];

        let err = args.to_settings().unwrap_err();
        assert!(matches!(err, CommandError::NameTableError(_)));
    }

    #[test]
    fn keep_empty_inverts_remove_empty() {
        let mut args = args("sheet.png");
        assert!(args.to_settings().unwrap().remove_empty);

        args.keep_empty = true;
        assert!(!args.to_settings().unwrap().remove_empty);
    }
}
