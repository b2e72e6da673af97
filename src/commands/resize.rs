use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use clap::{builder::PossibleValue, Args, ValueEnum};
use image::{imageops::FilterType, GenericImageView as _};
use strum::VariantArray;

use super::CommandError;
use crate::image_util;

#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// Images to resize.
    #[clap(required = true)]
    pub sources: Vec<PathBuf>,

    /// Target width in pixels. Derived from the height when omitted.
    #[clap(short = 'W', long)]
    pub width: Option<NonZeroU32>,

    /// Target height in pixels. Derived from the width when omitted.
    #[clap(short = 'H', long)]
    pub height: Option<NonZeroU32>,

    /// Resampling filter.
    #[clap(short, long, default_value_t = ResizeFilter::Lanczos)]
    pub filter: ResizeFilter,

    /// Produce one output per filter for side by side comparison.
    #[clap(long, action, conflicts_with = "filter")]
    pub compare: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, VariantArray)]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    Bicubic,
    Gaussian,
    #[default]
    Lanczos,
}

impl ResizeFilter {
    const fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Gaussian => "gaussian",
            Self::Lanczos => "lanczos",
        }
    }
}

impl std::fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(value: ResizeFilter) -> Self {
        match value {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Bilinear => Self::Triangle,
            ResizeFilter::Bicubic => Self::CatmullRom,
            ResizeFilter::Gaussian => Self::Gaussian,
            ResizeFilter::Lanczos => Self::Lanczos3,
        }
    }
}

impl ValueEnum for ResizeFilter {
    fn value_variants<'a>() -> &'a [Self] {
        Self::VARIANTS
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.name()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("at least one of --width / --height is required")]
    MissingDimensions,

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
}

pub fn resize(args: &ResizeArgs) -> Result<(), CommandError> {
    if args.width.is_none() && args.height.is_none() {
        return Err(ResizeError::MissingDimensions.into());
    }

    let mut failed = 0_usize;

    for source in &args.sources {
        let res = if args.compare {
            compare_filters(source, args.width, args.height)
        } else {
            resize_single(source, args.width, args.height, args.filter).map(|_| ())
        };

        if let Err(err) = res {
            error!("{}: {err}", source.display());
            failed += 1;
        }
    }

    if failed > 0 {
        warn!("{failed} of {} images failed", args.sources.len());
    }

    Ok(())
}

fn compare_filters(
    source: &Path,
    width: Option<NonZeroU32>,
    height: Option<NonZeroU32>,
) -> Result<(), ResizeError> {
    for &filter in ResizeFilter::VARIANTS {
        resize_single(source, width, height, filter)?;
    }

    Ok(())
}

fn resize_single(
    source: &Path,
    width: Option<NonZeroU32>,
    height: Option<NonZeroU32>,
    filter: ResizeFilter,
) -> Result<PathBuf, ResizeError> {
    let img = image::open(source).map_err(|err| ResizeError::Decode {
        path: source.to_path_buf(),
        source: err,
    })?;

    let (orig_width, orig_height) = img.dimensions();
    let (target_width, target_height) = resolve_size((orig_width, orig_height), width, height)
        .ok_or(ResizeError::MissingDimensions)?;

    let resized = img.resize_exact(target_width, target_height, filter.into());
    let out = image_util::unique_path(&output_name(source, filter, target_width, target_height));

    resized.save(&out).map_err(|err| ResizeError::Write {
        path: out.clone(),
        source: err,
    })?;

    info!(
        "{}: {orig_width}x{orig_height} -> {target_width}x{target_height} ({filter}), saved {}",
        source.display(),
        out.display()
    );

    Ok(out)
}

/// Fills in a missing dimension from the aspect ratio of the original.
/// Returns `None` when neither dimension is given.
fn resolve_size(
    (orig_width, orig_height): (u32, u32),
    width: Option<NonZeroU32>,
    height: Option<NonZeroU32>,
) -> Option<(u32, u32)> {
    match (width, height) {
        (Some(w), Some(h)) => Some((w.get(), h.get())),
        (Some(w), None) => {
            let ratio = f64::from(w.get()) / f64::from(orig_width);
            let h = (f64::from(orig_height) * ratio).round() as u32;
            Some((w.get(), h.max(1)))
        }
        (None, Some(h)) => {
            let ratio = f64::from(h.get()) / f64::from(orig_height);
            let w = (f64::from(orig_width) * ratio).round() as u32;
            Some((w.max(1), h.get()))
        }
        (None, None) => None,
    }
}

fn output_name(source: &Path, filter: ResizeFilter, width: u32, height: u32) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().to_string());
    let ext = source
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("png");

    source.with_file_name(format!(
        "{stem}_{}_{width}x{height}.{ext}",
        filter.name().to_uppercase()
    ))
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn nz(v: u32) -> Option<NonZeroU32> {
        Some(NonZeroU32::new(v).unwrap())
    }

    #[test]
    fn explicit_dimensions_pass_through() {
        assert_eq!(resolve_size((400, 300), nz(20), nz(10)), Some((20, 10)));
    }

    #[test]
    fn missing_height_is_derived_and_rounded() {
        assert_eq!(resolve_size((400, 300), nz(200), None), Some((200, 150)));
        // 33 * 0.5 = 16.5 rounds up, not truncates
        assert_eq!(resolve_size((100, 33), nz(50), None), Some((50, 17)));
    }

    #[test]
    fn missing_width_is_derived() {
        assert_eq!(resolve_size((300, 600), None, nz(200)), Some((100, 200)));
    }

    #[test]
    fn derived_dimension_never_hits_zero() {
        assert_eq!(resolve_size((1000, 1), nz(1), None), Some((1, 1)));
    }

    #[test]
    fn no_dimensions_is_rejected() {
        assert_eq!(resolve_size((10, 10), None, None), None);
    }

    #[test]
    fn output_name_embeds_filter_and_size() {
        let out = output_name(Path::new("art/img.png"), ResizeFilter::Nearest, 10, 20);
        assert_eq!(out, Path::new("art/img_NEAREST_10x20.png"));
    }

    #[test]
    fn collision_counter_instead_of_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pic.png");
        RgbaImage::from_pixel(8, 4, Rgba([5, 5, 5, 255]))
            .save(&source)
            .unwrap();

        let first = resize_single(&source, nz(4), None, ResizeFilter::Nearest).unwrap();
        assert_eq!(first, dir.path().join("pic_NEAREST_4x2.png"));

        let second = resize_single(&source, nz(4), None, ResizeFilter::Nearest).unwrap();
        assert_eq!(second, dir.path().join("pic_NEAREST_4x2_1.png"));

        assert_eq!(image::open(&first).unwrap().dimensions(), (4, 2));
    }

    #[test]
    fn compare_produces_one_output_per_filter() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pic.png");
        RgbaImage::from_pixel(8, 8, Rgba([90, 60, 30, 255]))
            .save(&source)
            .unwrap();

        compare_filters(&source, nz(4), nz(4)).unwrap();

        for filter in ResizeFilter::VARIANTS {
            let expected = dir
                .path()
                .join(format!("pic_{}_4x4.png", filter.name().to_uppercase()));
            assert!(expected.is_file(), "missing {}", expected.display());
        }
    }
}
