use std::{
    fs,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use clap::Args;
use serde::Deserialize;

use super::CommandError;
use crate::{
    image_util::OutputFormat,
    naming::{Axis, NameTable},
    split::{self, OrganizeBy, SplitReport, SplitSettings},
};

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON manifest describing the sheets to split.
    pub manifest: PathBuf,

    /// Output folder shared by all sheets.
    #[clap(short, long, default_value = "sprites")]
    pub output: PathBuf,
}

/// One sheet in the batch manifest.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchEntry {
    pub file: PathBuf,
    pub prefix: String,
    pub cols: NonZeroU32,
    pub rows: NonZeroU32,

    #[serde(default)]
    pub start_number: u32,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_remove_empty")]
    pub remove_empty: bool,

    #[serde(default)]
    pub organize_by: OrganizeBy,

    #[serde(default)]
    pub row_names: Option<Vec<String>>,

    #[serde(default)]
    pub col_names: Option<Vec<String>>,
}

const fn default_remove_empty() -> bool {
    true
}

impl BatchEntry {
    fn to_settings(&self) -> Result<SplitSettings, CommandError> {
        let cols = self.cols.get();
        let rows = self.rows.get();

        let row_names = self
            .row_names
            .as_deref()
            .map(|raw| NameTable::new(raw, rows as usize, Axis::Row))
            .transpose()?;

        let col_names = self
            .col_names
            .as_deref()
            .map(|raw| NameTable::new(raw, cols as usize, Axis::Column))
            .transpose()?;

        Ok(SplitSettings {
            cols,
            rows,
            prefix: self.prefix.clone(),
            start_number: self.start_number,
            format: self.format,
            remove_empty: self.remove_empty,
            organize_by: self.organize_by,
            row_names,
            col_names,
        })
    }
}

/// Splits every sheet in the manifest, in order.
///
/// A failing sheet is logged and does not stop the batch. This is the one
/// place where a sheet-level error is not fatal.
pub fn batch(args: &BatchArgs) -> Result<(), CommandError> {
    let raw = fs::read_to_string(&args.manifest)?;
    let entries: Vec<BatchEntry> = serde_json::from_str(&raw)?;

    if entries.is_empty() {
        warn!("manifest contains no sheets");
        return Ok(());
    }

    let mut reports = Vec::with_capacity(entries.len());
    let mut failed = 0_usize;

    for entry in &entries {
        info!("processing {}", entry.file.display());

        match process_entry(entry, &args.output) {
            Ok(report) => {
                super::log_report(&report);
                reports.push(report);
            }
            Err(err) => {
                error!("{}: {err}", entry.file.display());
                failed += 1;
            }
        }
    }

    let total_saved: u32 = reports.iter().map(|r| r.saved).sum();
    info!(
        "batch finished: {} sheets processed, {total_saved} frames saved, {failed} failed",
        reports.len()
    );

    Ok(())
}

fn process_entry(entry: &BatchEntry, output: &Path) -> Result<SplitReport, CommandError> {
    let settings = entry.to_settings()?;
    Ok(split::split_sheet(&entry.file, output, &settings)?)
}
