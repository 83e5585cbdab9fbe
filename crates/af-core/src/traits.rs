use crate::frame::{CharGrid, GlyphBitmap};

/// Renders a single glyph into an N×N binary bitmap.
///
/// Implementations must be deterministic: the catalog memoizes the first
/// result for each (character, font) pair and never asks again.
pub trait GlyphRasterizer {
    /// Draw `ch` with the font named `font` at `size` pixels.
    fn render(&self, ch: char, size: u32, font: &str) -> GlyphBitmap;
}

/// Sink for a finished character grid (console, HTML file, ...).
pub trait AsciiOutput {
    /// Write the grid.
    ///
    /// # Errors
    /// Returns an error if the underlying writer or file fails.
    fn output(&mut self, grid: &CharGrid) -> anyhow::Result<()>;
}
