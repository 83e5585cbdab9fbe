//! Pixel, brightness and character grids shared by every stage of the pipeline.

use anyhow::{Result, ensure};

/// Couleur neutre utilisée pour le padding (blanc).
pub const PADDING_COLOR: Rgb = Rgb::new(255, 255, 255);

/// Caractère placeholder quand aucun glyphe n'est disponible.
pub const PLACEHOLDER_CHAR: char = ' ';

/// Rec. 709 luma weights.
const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.7152;
const LUMA_B: f64 = 0.0722;

/// An 8-bit RGB sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Luminance in [0.0, 255.0].
    ///
    /// # Example
    /// ```
    /// use af_core::frame::Rgb;
    /// assert!((Rgb::new(255, 255, 255).luminance() - 255.0).abs() < 1e-9);
    /// assert_eq!(Rgb::new(0, 0, 0).luminance(), 0.0);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luminance(self) -> f64 {
        LUMA_R * f64::from(self.r) + LUMA_G * f64::from(self.g) + LUMA_B * f64::from(self.b)
    }
}

/// Smallest power of two greater than or equal to `x`; 1 for `x <= 1`.
///
/// # Example
/// ```
/// use af_core::frame::next_power_of_two;
/// assert_eq!(next_power_of_two(0), 1);
/// assert_eq!(next_power_of_two(5), 8);
/// assert_eq!(next_power_of_two(64), 64);
/// ```
#[must_use]
pub fn next_power_of_two(x: u32) -> u32 {
    if x <= 1 { 1 } else { x.next_power_of_two() }
}

/// Largest power of two less than or equal to `x`; 1 for `x <= 1`.
///
/// # Example
/// ```
/// use af_core::frame::floor_power_of_two;
/// assert_eq!(floor_power_of_two(0), 1);
/// assert_eq!(floor_power_of_two(10), 8);
/// assert_eq!(floor_power_of_two(64), 64);
/// ```
#[must_use]
pub fn floor_power_of_two(x: u32) -> u32 {
    if x <= 1 { 1 } else { 1 << (31 - x.leading_zeros()) }
}

/// Leading padding for one axis: excess split evenly, odd unit goes first.
#[inline]
fn leading_pad(original: u32, padded: u32) -> u32 {
    let excess = padded - original;
    excess - excess / 2
}

/// Rectangular grid of RGB samples, row-major.
///
/// Immutable once built. Images produced by [`RasterImage::pad`] (and by the
/// `af-source` loader) have power-of-two dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl RasterImage {
    /// Build an image from row-major samples.
    ///
    /// # Errors
    /// Returns an error if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        ensure!(
            pixels.len() == width as usize * height as usize,
            "pixel buffer holds {} samples, expected {width}x{height}",
            pixels.len()
        );
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image of a single uniform color.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::{RasterImage, Rgb};
    /// let img = RasterImage::filled(4, 2, Rgb::new(10, 20, 30));
    /// assert_eq!(img.pixel(3, 1), Rgb::new(10, 20, 30));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at column `x`, row `y`. Out-of-range coordinates read as [`PADDING_COLOR`].
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize]
        } else {
            PADDING_COLOR
        }
    }

    /// True when both dimensions are powers of two.
    #[must_use]
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Pad each axis to the next power of two with [`PADDING_COLOR`].
    ///
    /// The original samples are centered; on an odd excess the extra padding
    /// row/column goes to the top/left.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::{RasterImage, Rgb, PADDING_COLOR};
    /// let img = RasterImage::filled(3, 5, Rgb::new(0, 0, 0)).pad();
    /// assert_eq!((img.width(), img.height()), (4, 8));
    /// assert_eq!(img.pixel(0, 0), PADDING_COLOR);
    /// assert_eq!(img.pixel(1, 2), Rgb::new(0, 0, 0));
    /// ```
    #[must_use]
    pub fn pad(&self) -> Self {
        let width = next_power_of_two(self.width);
        let height = next_power_of_two(self.height);
        if width == self.width && height == self.height {
            return self.clone();
        }

        let left = leading_pad(self.width, width);
        let top = leading_pad(self.height, height);
        let mut padded = Self::filled(width, height, PADDING_COLOR);
        for y in 0..self.height {
            let src = y as usize * self.width as usize;
            let dst = (y + top) as usize * width as usize + left as usize;
            padded.pixels[dst..dst + self.width as usize]
                .copy_from_slice(&self.pixels[src..src + self.width as usize]);
        }
        padded
    }

    /// Square view of `size` pixels whose top-left corner is tile (`col`, `row`).
    #[must_use]
    pub fn tile(&self, col: u32, row: u32, size: u32) -> Tile<'_> {
        Tile::new(self, col * size, row * size, size)
    }

    /// Partition the image into `tile_size`-sided tiles, row-major.
    ///
    /// # Panics
    /// Panics if `tile_size` is zero or does not divide both dimensions.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::{RasterImage, Rgb};
    /// let img = RasterImage::filled(8, 4, Rgb::new(255, 255, 255));
    /// let tiles = img.subdivide(2);
    /// assert_eq!((tiles.columns(), tiles.rows()), (4, 2));
    /// ```
    #[must_use]
    pub fn subdivide(&self, tile_size: u32) -> TileGrid<'_> {
        assert!(
            tile_size > 0 && self.width % tile_size == 0 && self.height % tile_size == 0,
            "tile size {tile_size} does not divide {}x{}",
            self.width,
            self.height
        );
        let columns = self.width / tile_size;
        let rows = self.height / tile_size;
        let tiles = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| (col, row)))
            .map(|(col, row)| self.tile(col, row, tile_size))
            .collect();
        TileGrid {
            columns,
            rows,
            tiles,
        }
    }
}

/// Square view over a block of a [`RasterImage`].
///
/// Brightness is measured once at construction:
/// `Σ luminance / (size² × 255)`, in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    image: &'a RasterImage,
    x0: u32,
    y0: u32,
    size: u32,
    brightness: f64,
}

impl<'a> Tile<'a> {
    #[must_use]
    pub fn new(image: &'a RasterImage, x0: u32, y0: u32, size: u32) -> Self {
        let mut sum = 0.0;
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                sum += image.pixel(x, y).luminance();
            }
        }
        let area = f64::from(size) * f64::from(size);
        let brightness = if area > 0.0 { sum / (area * 255.0) } else { 0.0 };
        Self {
            image,
            x0,
            y0,
            size,
            brightness,
        }
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Sample in tile-local coordinates.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        if x < self.size && y < self.size {
            self.image.pixel(self.x0 + x, self.y0 + y)
        } else {
            PADDING_COLOR
        }
    }
}

/// Row-major grid of tiles produced by [`RasterImage::subdivide`].
#[derive(Debug, Clone)]
pub struct TileGrid<'a> {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile<'a>>,
}

impl<'a> TileGrid<'a> {
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> Option<&Tile<'a>> {
        if col < self.columns && row < self.rows {
            self.tiles.get(row as usize * self.columns as usize + col as usize)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile<'a>> {
        self.tiles.iter()
    }

    /// Detach the measured brightness values from the image borrow.
    #[must_use]
    pub fn brightness_grid(&self) -> BrightnessGrid {
        BrightnessGrid {
            columns: self.columns,
            rows: self.rows,
            values: self.tiles.iter().map(Tile::brightness).collect(),
        }
    }
}

/// Per-tile brightness values, row-major. Independent of any character set.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessGrid {
    columns: u32,
    rows: u32,
    values: Vec<f64>,
}

impl BrightnessGrid {
    /// # Errors
    /// Returns an error if `values.len() != columns * rows`.
    pub fn from_values(columns: u32, rows: u32, values: Vec<f64>) -> Result<Self> {
        ensure!(
            values.len() == columns as usize * rows as usize,
            "brightness grid holds {} values, expected {columns}x{rows}",
            values.len()
        );
        Ok(Self {
            columns,
            rows,
            values,
        })
    }

    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub fn get(&self, col: u32, row: u32) -> Option<f64> {
        if col < self.columns && row < self.rows {
            self.values
                .get(row as usize * self.columns as usize + col as usize)
                .copied()
        } else {
            None
        }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Character grid, row-major. This is the engine's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    width: u32,
    height: u32,
    cells: Vec<char>,
}

impl CharGrid {
    /// Grid of `width` columns by `height` rows, every cell set to `ch`.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::CharGrid;
    /// let grid = CharGrid::filled(3, 2, '#');
    /// assert_eq!(grid.rows().count(), 2);
    /// assert_eq!(grid.get(2, 1), Some('#'));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, ch: char) -> Self {
        Self {
            width,
            height,
            cells: vec![ch; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<char> {
        if x < self.width && y < self.height {
            self.cells
                .get(y as usize * self.width as usize + x as usize)
                .copied()
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u32, y: u32, ch: char) {
        if x < self.width && y < self.height {
            self.cells[y as usize * self.width as usize + x as usize] = ch;
        }
    }

    /// Rows as character slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    #[must_use]
    pub fn cells(&self) -> &[char] {
        &self.cells
    }
}

/// N×N binary rendering of a glyph. `true` marks a cell left blank by the ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    size: u32,
    blank: Vec<bool>,
}

impl GlyphBitmap {
    /// Fully blank bitmap (no ink).
    #[must_use]
    pub fn blank(size: u32) -> Self {
        Self {
            size,
            blank: vec![true; size as usize * size as usize],
        }
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Mark cell (`x`, `y`) as inked.
    pub fn ink(&mut self, x: u32, y: u32) {
        if x < self.size && y < self.size {
            self.blank[y as usize * self.size as usize + x as usize] = false;
        }
    }

    #[must_use]
    pub fn is_blank(&self, x: u32, y: u32) -> bool {
        x < self.size && y < self.size && self.blank[y as usize * self.size as usize + x as usize]
    }

    #[must_use]
    pub fn blank_count(&self) -> usize {
        self.blank.iter().filter(|&&b| b).count()
    }

    /// Fraction of blank cells, in [0, 1].
    ///
    /// # Example
    /// ```
    /// use af_core::frame::GlyphBitmap;
    /// let mut bmp = GlyphBitmap::blank(2);
    /// bmp.ink(0, 0);
    /// assert_eq!(bmp.blank_fraction(), 0.75);
    /// ```
    #[must_use]
    pub fn blank_fraction(&self) -> f64 {
        if self.blank.is_empty() {
            return 0.0;
        }
        self.blank_count() as f64 / self.blank.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterImage {
        let pixels = (0..width * height)
            .map(|i| {
                let v = (i % 256) as u8;
                Rgb::new(v, v, v)
            })
            .collect();
        RasterImage::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn next_power_of_two_is_tight() {
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(1000), 1024);
        for x in 2..2000u32 {
            let p = next_power_of_two(x);
            assert!(p.is_power_of_two());
            assert!(p >= x && p < 2 * x, "{x} -> {p}");
        }
    }

    #[test]
    fn floor_power_of_two_rounds_down() {
        assert_eq!(floor_power_of_two(0), 1);
        assert_eq!(floor_power_of_two(1), 1);
        assert_eq!(floor_power_of_two(63), 32);
        assert_eq!(floor_power_of_two(64), 64);
        for x in 1..2000u32 {
            let p = floor_power_of_two(x);
            assert!(p.is_power_of_two() && p <= x && x < 2 * p, "{x} -> {p}");
        }
    }

    #[test]
    fn pad_dimensions_are_tight_powers_of_two() {
        for (w, h) in [(1, 1), (3, 7), (8, 8), (9, 2), (100, 33), (17, 64)] {
            let img = gradient(w, h).pad();
            assert!(img.is_power_of_two());
            assert!(img.width() >= w && img.width() < 2 * w.max(1));
            assert!(img.height() >= h && img.height() < 2 * h.max(1));
        }
    }

    #[test]
    fn pad_keeps_power_of_two_image_unchanged() {
        let img = gradient(8, 8);
        assert_eq!(img.pad(), img);
    }

    #[test]
    fn pad_places_odd_excess_on_leading_side() {
        // 5 -> 8: excess 3, two columns left, one right.
        let src = RasterImage::filled(5, 1, Rgb::new(0, 0, 0));
        let img = src.pad();
        let row: Vec<bool> = (0..8).map(|x| img.pixel(x, 0) == PADDING_COLOR).collect();
        assert_eq!(
            row,
            vec![true, true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn pad_splits_even_excess_evenly() {
        // 6 -> 8: one row each side.
        let src = RasterImage::filled(1, 6, Rgb::new(0, 0, 0));
        let img = src.pad();
        assert_eq!(img.height(), 8);
        assert_eq!(img.pixel(0, 0), PADDING_COLOR);
        assert_eq!(img.pixel(0, 1), Rgb::new(0, 0, 0));
        assert_eq!(img.pixel(0, 6), Rgb::new(0, 0, 0));
        assert_eq!(img.pixel(0, 7), PADDING_COLOR);
    }

    #[test]
    fn pad_preserves_pixel_order() {
        let src = gradient(3, 3);
        let img = src.pad();
        // 3 -> 4: excess 1, goes top/left.
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(img.pixel(x + 1, y + 1), src.pixel(x, y));
            }
        }
    }

    #[test]
    fn from_pixels_rejects_wrong_length() {
        assert!(RasterImage::from_pixels(2, 2, vec![Rgb::default(); 3]).is_err());
    }

    #[test]
    fn tile_brightness_uses_luminance_average() {
        let white = RasterImage::filled(4, 4, Rgb::new(255, 255, 255));
        assert!((white.tile(0, 0, 4).brightness() - 1.0).abs() < 1e-9);

        let black = RasterImage::filled(4, 4, Rgb::new(0, 0, 0));
        assert_eq!(black.tile(0, 0, 4).brightness(), 0.0);

        let red = RasterImage::filled(2, 2, Rgb::new(255, 0, 0));
        assert!((red.tile(0, 0, 2).brightness() - 0.2126).abs() < 1e-9);
    }

    #[test]
    fn subdivide_is_row_major() {
        let mut pixels = vec![Rgb::new(255, 255, 255); 16];
        // Top-right 2x2 block black.
        for (x, y) in [(2, 0), (3, 0), (2, 1), (3, 1)] {
            pixels[y * 4 + x] = Rgb::new(0, 0, 0);
        }
        let img = RasterImage::from_pixels(4, 4, pixels).unwrap();
        let tiles = img.subdivide(2);
        let values: Vec<f64> = tiles.iter().map(Tile::brightness).collect();
        assert_eq!(values.len(), 4);
        assert_eq!(values[1], 0.0);
        assert!((values[0] - 1.0).abs() < 1e-9);
        assert!(tiles.get(1, 0).is_some_and(|t| t.pixel(0, 0) == Rgb::new(0, 0, 0)));
    }

    #[test]
    #[should_panic(expected = "does not divide")]
    fn subdivide_rejects_non_divisor() {
        let img = RasterImage::filled(8, 8, PADDING_COLOR);
        let _ = img.subdivide(3);
    }

    #[test]
    fn brightness_grid_matches_tiles() {
        let img = gradient(8, 4);
        let tiles = img.subdivide(4);
        let grid = tiles.brightness_grid();
        assert_eq!((grid.columns(), grid.rows()), (2, 1));
        assert_eq!(grid.get(1, 0), tiles.get(1, 0).map(Tile::brightness));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn char_grid_rows() {
        let mut grid = CharGrid::filled(2, 2, '.');
        grid.set(1, 1, '#');
        let rows: Vec<String> = grid.rows().map(|r| r.iter().collect()).collect();
        assert_eq!(rows, vec!["..".to_string(), ".#".to_string()]);
        assert_eq!(CharGrid::filled(0, 0, ' ').rows().count(), 0);
    }
}
