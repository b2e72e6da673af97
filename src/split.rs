//! Grid splitting core: frame geometry, empty-frame detection and
//! output path resolution for a single sprite sheet.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{builder::PossibleValue, ValueEnum};
use image::{imageops, RgbaImage};
use serde::Deserialize;
use strum::VariantArray;

use crate::{
    image_util::{self, OutputFormat},
    naming::NameTable,
};

/// Subdirectory nesting strategy for the produced frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, VariantArray, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizeBy {
    /// All frames directly in the output folder.
    #[default]
    None,
    /// One subfolder per column.
    Column,
    /// One subfolder per row.
    Row,
    /// Nested subfolders, row first then column.
    Both,
}

impl OrganizeBy {
    const fn has_row_dir(self) -> bool {
        matches!(self, Self::Row | Self::Both)
    }

    const fn has_col_dir(self) -> bool {
        matches!(self, Self::Column | Self::Both)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Column => "column",
            Self::Row => "row",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for OrganizeBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ValueEnum for OrganizeBy {
    fn value_variants<'a>() -> &'a [Self] {
        Self::VARIANTS
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.name()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("frame size would be zero: {cols}x{rows} grid on a {width}x{height} sheet")]
    InvalidGeometry {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the splitter needs besides the sheet itself.
///
/// `cols` and `rows` are guaranteed non-zero by the CLI / manifest layer,
/// name tables are pre-validated against the axis lengths.
#[derive(Debug, Clone)]
pub struct SplitSettings {
    pub cols: u32,
    pub rows: u32,
    pub prefix: String,
    pub start_number: u32,
    pub format: OutputFormat,
    pub remove_empty: bool,
    pub organize_by: OrganizeBy,
    pub row_names: Option<NameTable>,
    pub col_names: Option<NameTable>,
}

impl SplitSettings {
    fn row_label(&self, row: u32) -> String {
        self.row_names
            .as_ref()
            .and_then(|t| t.get(row))
            .map_or_else(|| format!("row_{row}"), ToOwned::to_owned)
    }

    fn col_label(&self, col: u32) -> String {
        self.col_names
            .as_ref()
            .and_then(|t| t.get(col))
            .map_or_else(|| format!("col_{col}"), ToOwned::to_owned)
    }

    fn cell_dir(&self, base: &Path, row: u32, col: u32) -> PathBuf {
        match self.organize_by {
            OrganizeBy::None => base.to_path_buf(),
            OrganizeBy::Column => base.join(self.col_label(col)),
            OrganizeBy::Row => base.join(self.row_label(row)),
            OrganizeBy::Both => base.join(self.row_label(row)).join(self.col_label(col)),
        }
    }

    /// `{prefix}_[{row_label}_][{col_label}_]{number}.{ext}`
    ///
    /// A label lands in the file name only when a custom table exists for
    /// that axis and the axis is not already a directory segment, so the
    /// label is never duplicated between folder and file.
    fn file_name(&self, row: u32, col: u32, number: u32) -> String {
        let mut name = self.prefix.clone();

        if self.row_names.is_some() && !self.organize_by.has_row_dir() {
            name.push('_');
            name.push_str(&self.row_label(row));
        }

        if self.col_names.is_some() && !self.organize_by.has_col_dir() {
            name.push('_');
            name.push_str(&self.col_label(col));
        }

        name.push('_');
        name.push_str(&number.to_string());
        name.push('.');
        name.push_str(self.format.extension());

        name
    }
}

/// What happened to a single grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    Written(PathBuf),
    SkippedEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellReport {
    pub row: u32,
    pub col: u32,
    pub outcome: CellOutcome,
}

#[derive(Debug, Clone)]
pub struct SplitReport {
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub total_cells: u32,
    pub saved: u32,
    pub skipped_empty: u32,
    pub cells: Vec<CellReport>,
}

/// Decodes `source` and splits it into `output_dir`.
pub fn split_sheet(
    source: &Path,
    output_dir: &Path,
    settings: &SplitSettings,
) -> Result<SplitReport, SplitError> {
    let sheet = image::open(source)
        .map_err(|source_err| SplitError::Decode {
            path: source.to_path_buf(),
            source: source_err,
        })?
        .to_rgba8();

    split_image(&sheet, output_dir, settings)
}

/// Splits an already decoded sheet.
///
/// Cells are visited in row-major order. Frame numbers are assigned only
/// to saved frames, so the numbering stays contiguous from
/// `start_number` no matter how many cells are skipped. The first failed
/// write aborts the whole call, frames written before it stay on disk.
pub fn split_image(
    sheet: &RgbaImage,
    output_dir: &Path,
    settings: &SplitSettings,
) -> Result<SplitReport, SplitError> {
    let (sheet_width, sheet_height) = sheet.dimensions();

    // integer division: remainder pixels on the right / bottom edge are
    // outside every cell and never get sampled
    let frame_width = sheet_width / settings.cols;
    let frame_height = sheet_height / settings.rows;

    if frame_width == 0 || frame_height == 0 {
        return Err(SplitError::InvalidGeometry {
            width: sheet_width,
            height: sheet_height,
            cols: settings.cols,
            rows: settings.rows,
        });
    }

    fs::create_dir_all(output_dir)?;

    let total_cells = settings.cols * settings.rows;
    let mut cells = Vec::with_capacity(total_cells as usize);
    let mut saved = 0;
    let mut skipped_empty = 0;

    for row in 0..settings.rows {
        for col in 0..settings.cols {
            let frame = imageops::crop_imm(
                sheet,
                col * frame_width,
                row * frame_height,
                frame_width,
                frame_height,
            )
            .to_image();

            if settings.remove_empty && image_util::is_fully_transparent(&frame) {
                debug!("cell ({row}, {col}) is fully transparent, skipping");
                skipped_empty += 1;
                cells.push(CellReport {
                    row,
                    col,
                    outcome: CellOutcome::SkippedEmpty,
                });
                continue;
            }

            let dir = settings.cell_dir(output_dir, row, col);
            if dir != output_dir {
                fs::create_dir_all(&dir)?;
            }

            let number = settings.start_number + saved;
            let path = dir.join(settings.file_name(row, col, number));

            image_util::save_frame(&frame, &path, settings.format).map_err(|source| {
                SplitError::Write {
                    path: path.clone(),
                    source,
                }
            })?;

            saved += 1;
            cells.push(CellReport {
                row,
                col,
                outcome: CellOutcome::Written(path),
            });
        }
    }

    Ok(SplitReport {
        sheet_width,
        sheet_height,
        frame_width,
        frame_height,
        total_cells,
        saved,
        skipped_empty,
        cells,
    })
}
