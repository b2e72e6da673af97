use std::path::{Path, PathBuf};

use clap::{builder::PossibleValue, ValueEnum};
use image::{buffer::ConvertBuffer, ImageFormat, RgbImage, RgbaImage};
use serde::Deserialize;
use strum::VariantArray;

/// Encodings supported for saved frames.
///
/// JPEG has no alpha channel, frames are flattened to RGB when saving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, VariantArray, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        Self::VARIANTS
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.extension()))
    }
}

pub fn save_frame(
    frame: &RgbaImage,
    path: &Path,
    format: OutputFormat,
) -> Result<(), image::ImageError> {
    match format {
        OutputFormat::Png => frame.save_with_format(path, ImageFormat::Png),
        OutputFormat::Jpeg => {
            let flat: RgbImage = frame.convert();
            flat.save_with_format(path, ImageFormat::Jpeg)
        }
    }
}

/// A frame is empty when every pixel is fully transparent.
pub fn is_fully_transparent(image: &RgbaImage) -> bool {
    image.pixels().all(|pxl| pxl[3] == 0)
}

/// Appends `_1`, `_2`, ... to the file stem until the path no longer exists.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());

    let mut counter = 1_usize;
    loop {
        let name = ext.as_ref().map_or_else(
            || format!("{stem}_{counter}"),
            |ext| format!("{stem}_{counter}.{ext}"),
        );

        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }

        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn transparent_frame_is_empty() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        assert!(is_fully_transparent(&img));
    }

    #[test]
    fn single_visible_pixel_is_not_empty() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        img.put_pixel(3, 2, Rgba([255, 0, 0, 1]));
        assert!(!is_fully_transparent(&img));
    }

    #[test]
    fn opaque_frame_is_not_empty() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        assert!(!is_fully_transparent(&img));
    }

    #[test]
    fn unique_path_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        assert_eq!(unique_path(&path), path);

        std::fs::write(&path, b"x").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("out_1.png"));

        std::fs::write(dir.path().join("out_1.png"), b"x").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("out_2.png"));
    }

    #[test]
    fn jpeg_save_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpeg");
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 100, 50, 128]));

        save_frame(&img, &path, OutputFormat::Jpeg).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.width(), 8);
        assert_eq!(reloaded.height(), 8);
    }
}
