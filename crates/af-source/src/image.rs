//! Image file loading.
use std::path::Path;

use af_core::frame::{RasterImage, Rgb};
use anyhow::{Context, Result};

/// Convert a decoded `image` buffer to a [`RasterImage`] (no padding).
///
/// Alpha is discarded; the `image` crate flattens it when converting to RGB8.
///
/// # Example
/// ```
/// use af_source::image::from_dynamic;
/// let img = image::DynamicImage::new_rgb8(3, 2);
/// let raster = from_dynamic(&img).unwrap();
/// assert_eq!((raster.width(), raster.height()), (3, 2));
/// ```
///
/// # Errors
/// Returns an error if the decoded buffer is inconsistent with its dimensions.
pub fn from_dynamic(img: &image::DynamicImage) -> Result<RasterImage> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            Rgb::new(r, g, b)
        })
        .collect();
    RasterImage::from_pixels(width, height, pixels)
}

/// Decode an image file without padding.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn load_unpadded(path: &Path) -> Result<RasterImage> {
    let img = image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
    from_dynamic(&img)
}

/// Load an image and pad it to power-of-two dimensions.
///
/// This is the only way the app builds a [`RasterImage`]; nothing partial is
/// returned on failure.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use af_source::image::load_image;
/// use std::path::Path;
/// let img = load_image(Path::new("board.jpeg")).unwrap();
/// assert!(img.is_power_of_two());
/// ```
pub fn load_image(path: &Path) -> Result<RasterImage> {
    let raw = load_unpadded(path)?;
    let padded = raw.pad();
    log::info!(
        "Loaded {} ({}x{} -> {}x{})",
        path.display(),
        raw.width(),
        raw.height(),
        padded.width(),
        padded.height()
    );
    Ok(padded)
}
