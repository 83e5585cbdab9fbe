//! Test-only rasterizer with fixed blank fractions per character.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use af_core::frame::GlyphBitmap;
use af_core::traits::GlyphRasterizer;

/// Characters missing from the table render fully inked (brightness 0).
pub struct TableRasterizer {
    blank: HashMap<char, f64>,
    calls: Rc<Cell<usize>>,
}

impl TableRasterizer {
    pub fn new(table: &[(char, f64)]) -> Self {
        Self {
            blank: table.iter().copied().collect(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Shared render counter.
    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl GlyphRasterizer for TableRasterizer {
    fn render(&self, ch: char, size: u32, _font: &str) -> GlyphBitmap {
        self.calls.set(self.calls.get() + 1);
        let mut bitmap = GlyphBitmap::blank(size);
        let cells = size * size;
        let fraction = self.blank.get(&ch).copied().unwrap_or(0.0);
        let blank = (fraction * f64::from(cells)).round() as u32;
        for i in 0..cells.saturating_sub(blank) {
            bitmap.ink(i % size, i / size);
        }
        bitmap
    }
}
