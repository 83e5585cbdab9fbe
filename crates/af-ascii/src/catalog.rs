//! Glyph Brightness Catalog: memoized (character, font) -> brightness.

use std::collections::HashMap;

use af_core::traits::GlyphRasterizer;

/// Côté par défaut de la bitmap de mesure (16×16).
pub const DEFAULT_GLYPH_RESOLUTION: u32 = 16;

/// Append-only table of measured glyph brightness values.
///
/// A glyph's brightness is the fraction of cells its N×N bitmap leaves blank,
/// so it lives in [0, 1] with a space at 1.0. Entries are computed on first
/// request and never invalidated.
///
/// The catalog is owned by whichever component runs conversions; callers that
/// need to share it across threads must wrap the whole check-then-insert of
/// [`GlyphCatalog::ensure`] in a single lock.
pub struct GlyphCatalog {
    rasterizer: Box<dyn GlyphRasterizer>,
    resolution: u32,
    // font -> char -> brightness
    entries: HashMap<String, HashMap<char, f64>>,
}

impl GlyphCatalog {
    #[must_use]
    pub fn new(rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        Self::with_resolution(rasterizer, DEFAULT_GLYPH_RESOLUTION)
    }

    /// # Panics
    /// Panics if `resolution` is zero.
    #[must_use]
    pub fn with_resolution(rasterizer: Box<dyn GlyphRasterizer>, resolution: u32) -> Self {
        assert!(resolution > 0, "glyph resolution must be positive");
        Self {
            rasterizer,
            resolution,
            entries: HashMap::new(),
        }
    }

    /// Brightness of `ch` in `font`, measuring it on first use.
    pub fn ensure(&mut self, ch: char, font: &str) -> f64 {
        if let Some(value) = self.raw_brightness(ch, font) {
            return value;
        }
        let bitmap = self.rasterizer.render(ch, self.resolution, font);
        let value = bitmap.blank_fraction();
        log::debug!("Measured {ch:?} in '{font}': {value:.4}");
        self.entries
            .entry(font.to_string())
            .or_default()
            .insert(ch, value);
        value
    }

    /// Lookup without measuring.
    #[must_use]
    pub fn raw_brightness(&self, ch: char, font: &str) -> Option<f64> {
        self.entries.get(font).and_then(|m| m.get(&ch)).copied()
    }

    /// Number of (character, font) pairs measured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for GlyphCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCatalog")
            .field("resolution", &self.resolution)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
