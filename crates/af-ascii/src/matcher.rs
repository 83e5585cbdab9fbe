//! Brightness matcher: image + active set + columns -> character grid.
//!
//! Two memo levels avoid redundant work between calls:
//! - the last answer (columns, sorted set, normalized map, grid) is returned
//!   as is when neither columns nor set changed, and its normalized map is
//!   reused when only the columns changed;
//! - the [`ResolutionCache`] keeps per-tile brightness grids by tile size,
//!   which do not depend on the set at all.

use std::sync::Arc;

use af_core::frame::{BrightnessGrid, CharGrid, PLACEHOLDER_CHAR, RasterImage, floor_power_of_two};
use anyhow::{Context, Result, ensure};

use crate::cache::ResolutionCache;
use crate::catalog::GlyphCatalog;
use crate::normalize::{BrightnessMap, normalize};

/// Counters exposed for tests and debug logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Calls to [`Matcher::convert`] that passed validation.
    pub conversions: u64,
    /// Calls answered from the last-answer memo.
    pub memo_hits: u64,
    /// Brightness grids served by the resolution cache.
    pub cache_hits: u64,
    /// Brightness grids computed from the image.
    pub cache_misses: u64,
    /// Tiles whose brightness was measured from pixels.
    pub tiles_measured: u64,
    /// Normalized maps built from the catalog.
    pub normalizations: u64,
}

/// Memo-of-one for the previous request.
struct LastConversion {
    columns: u32,
    chars: Vec<char>,
    normalized: BrightnessMap,
    grid: CharGrid,
}

/// Column bounds for an image: `[max(1, w/h), w / min_pixels_per_char]`.
///
/// The upper bound is rounded down to a power of two, so every count reached
/// by doubling or halving inside the bounds divides a padded width.
///
/// # Example
/// ```
/// use af_core::frame::{RasterImage, Rgb};
/// use af_ascii::matcher::column_bounds;
/// let img = RasterImage::filled(256, 64, Rgb::new(0, 0, 0));
/// assert_eq!(column_bounds(&img, 2), (4, 128));
/// assert_eq!(column_bounds(&img, 3), (4, 64));
/// ```
#[must_use]
pub fn column_bounds(image: &RasterImage, min_pixels_per_char: u32) -> (u32, u32) {
    let min = (image.width() / image.height().max(1)).max(1);
    let max = floor_power_of_two(image.width() / min_pixels_per_char.max(1)).max(min);
    (min, max)
}

/// Converts one image to character grids for varying sets and resolutions.
///
/// The image is bound at construction; the catalog and the resolution cache
/// are owned exclusively by the matcher.
pub struct Matcher {
    image: RasterImage,
    font: String,
    catalog: GlyphCatalog,
    cache: ResolutionCache,
    last: Option<LastConversion>,
    stats: ConversionStats,
}

impl Matcher {
    #[must_use]
    pub fn new(image: RasterImage, font: impl Into<String>, catalog: GlyphCatalog) -> Self {
        Self::with_cache(image, font, catalog, ResolutionCache::default())
    }

    #[must_use]
    pub fn with_cache(
        image: RasterImage,
        font: impl Into<String>,
        catalog: GlyphCatalog,
        cache: ResolutionCache,
    ) -> Self {
        if !image.is_power_of_two() {
            log::warn!(
                "Matcher image is {}x{}, not padded to powers of two",
                image.width(),
                image.height()
            );
        }
        Self {
            image,
            font: font.into(),
            catalog,
            cache,
            last: None,
            stats: ConversionStats::default(),
        }
    }

    #[must_use]
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    #[must_use]
    pub fn font(&self) -> &str {
        &self.font
    }

    #[must_use]
    pub fn catalog(&self) -> &GlyphCatalog {
        &self.catalog
    }

    /// Measure `ch` ahead of time (the shell does this when characters are added).
    pub fn ensure_glyph(&mut self, ch: char) -> f64 {
        self.catalog.ensure(ch, &self.font)
    }

    #[must_use]
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    #[must_use]
    pub fn stats(&self) -> ConversionStats {
        self.stats
    }

    /// Convert the image to a grid of `columns` characters per row.
    ///
    /// `chars` may be in any order and contain duplicates. An empty set
    /// yields an all-[`PLACEHOLDER_CHAR`] grid.
    ///
    /// # Errors
    /// Returns an error if `columns` is zero, does not divide the image
    /// width, or yields a tile size that does not divide the height.
    pub fn convert(&mut self, chars: &[char], columns: u32) -> Result<&CharGrid> {
        self.refresh(chars, columns)?;
        self.last
            .as_ref()
            .map(|last| &last.grid)
            .context("conversion produced no grid")
    }

    /// Bring `self.last` up to date for (`chars`, `columns`).
    fn refresh(&mut self, chars: &[char], columns: u32) -> Result<()> {
        let tile_size = self.tile_size(columns)?;
        let mut sorted = chars.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.stats.conversions += 1;

        let unchanged = self
            .last
            .as_ref()
            .is_some_and(|last| last.columns == columns && last.chars == sorted);
        if unchanged {
            self.stats.memo_hits += 1;
            log::debug!("Reusing previous grid ({columns} columns)");
            return Ok(());
        }

        let rows = self.image.height() / tile_size;
        let (normalized, grid) = if sorted.is_empty() {
            (
                BrightnessMap::default(),
                CharGrid::filled(columns, rows, PLACEHOLDER_CHAR),
            )
        } else {
            let normalized = match self.last.take() {
                Some(last) if last.chars == sorted => {
                    log::debug!("Character set unchanged, reusing normalized map");
                    last.normalized
                }
                _ => {
                    self.stats.normalizations += 1;
                    normalize(&mut self.catalog, &self.font, &sorted)
                }
            };
            let brightness = self.brightness_grid(tile_size);
            let grid = match_grid(&brightness, &normalized);
            (normalized, grid)
        };

        self.last = Some(LastConversion {
            columns,
            chars: sorted,
            normalized,
            grid,
        });
        Ok(())
    }

    fn tile_size(&self, columns: u32) -> Result<u32> {
        let (width, height) = (self.image.width(), self.image.height());
        ensure!(
            columns > 0 && columns <= width,
            "{columns} columns out of range 1..={width}"
        );
        ensure!(
            width % columns == 0,
            "{columns} columns do not evenly divide width {width}"
        );
        let tile_size = width / columns;
        ensure!(
            tile_size <= height && height % tile_size == 0,
            "tile size {tile_size} does not divide height {height}"
        );
        Ok(tile_size)
    }

    /// Per-tile brightness at `tile_size`, from the cache or from pixels.
    fn brightness_grid(&mut self, tile_size: u32) -> Arc<BrightnessGrid> {
        if let Some(grid) = self.cache.lookup(tile_size) {
            self.stats.cache_hits += 1;
            log::debug!("Resolution cache hit for tile size {tile_size}");
            return grid;
        }
        self.stats.cache_misses += 1;
        log::debug!("Resolution cache miss for tile size {tile_size}");
        let grid = Arc::new(self.image.subdivide(tile_size).brightness_grid());
        self.stats.tiles_measured += grid.values().len() as u64;
        self.cache.store(tile_size, Arc::clone(&grid));
        grid
    }
}

/// Nearest-brightness character for every tile.
fn match_grid(brightness: &BrightnessGrid, normalized: &BrightnessMap) -> CharGrid {
    let mut grid = CharGrid::filled(brightness.columns(), brightness.rows(), PLACEHOLDER_CHAR);
    for row in 0..brightness.rows() {
        for col in 0..brightness.columns() {
            let ch = brightness
                .get(col, row)
                .and_then(|value| normalized.nearest(value))
                .unwrap_or(PLACEHOLDER_CHAR);
            grid.set(col, row, ch);
        }
    }
    grid
}
