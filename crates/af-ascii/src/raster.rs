//! Glyph rasterisation with `ab_glyph`, plus system font discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, point};
use af_core::frame::GlyphBitmap;
use af_core::traits::GlyphRasterizer;
use anyhow::{Context, Result};

/// Pen origin, as a fraction of the bitmap side.
const X_OFFSET_FACTOR: f32 = 0.2;
/// Baseline, as a fraction of the bitmap side.
const Y_OFFSET_FACTOR: f32 = 0.75;
/// Couverture minimale pour qu'un pixel soit considéré encré.
const INK_THRESHOLD: f32 = 0.5;
/// Seuil relatif au pic de couverture, pour garder les traits fins ('_', '|').
const PEAK_FRACTION: f32 = 0.5;

/// Faces essayées quand la police demandée est introuvable.
const FALLBACK_FACES: &[&str] = &[
    "cour",
    "DejaVuSansMono",
    "LiberationMono-Regular",
    "NotoSansMono-Regular",
    "UbuntuMono-R",
    "Menlo",
    "consola",
];

/// Profondeur max de la recherche récursive dans les dossiers de polices.
const MAX_SCAN_DEPTH: usize = 4;

/// Lowercase, whitespace/dash/underscore stripped: "Courier New" == "couriernew".
fn face_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Binary glyph renderer backed by one or more TrueType/OpenType faces.
///
/// Faces are registered under a name; rendering with an unknown name falls
/// back to the first registered face.
pub struct FontRasterizer {
    default_key: String,
    faces: HashMap<String, FontVec>,
}

impl FontRasterizer {
    /// Build from raw font bytes registered under `name`.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a parsable font.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self> {
        let face = FontVec::try_from_vec(bytes)
            .map_err(|e| anyhow::anyhow!("Invalid font data for {name}: {e}"))?;
        let default_key = face_key(name);
        let mut faces = HashMap::new();
        faces.insert(default_key.clone(), face);
        Ok(Self { default_key, faces })
    }

    /// Load a font file and register it under `name`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(name: &str, path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Cannot read font {}", path.display()))?;
        let rasterizer = Self::from_bytes(name, bytes)
            .with_context(|| format!("Cannot parse font {}", path.display()))?;
        log::info!("Loaded font '{name}' from {}", path.display());
        Ok(rasterizer)
    }

    /// Locate a font file for `name` (explicit path first), then load it.
    ///
    /// # Errors
    /// Returns an error if no usable font file is found.
    pub fn discover(name: &str, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(name, path);
        }
        let path = find_font_file(name)
            .or_else(|| {
                FALLBACK_FACES.iter().find_map(|face| {
                    let found = find_font_file(face);
                    if found.is_some() {
                        log::warn!("Font '{name}' not found, using '{face}' instead");
                    }
                    found
                })
            })
            .with_context(|| {
                format!("No font file found for '{name}'; set font_path in the config")
            })?;
        Self::from_file(name, &path)
    }

    fn face(&self, name: &str) -> Option<&FontVec> {
        let key = face_key(name);
        self.faces.get(&key).or_else(|| {
            log::warn!("Unknown font '{name}', rendering with the default face");
            self.faces.get(&self.default_key)
        })
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn render(&self, ch: char, size: u32, font: &str) -> GlyphBitmap {
        let bitmap = GlyphBitmap::blank(size);
        let Some(face) = self.face(font) else {
            return bitmap;
        };

        let id = face.glyph_id(ch);
        if id.0 == 0 && !ch.is_whitespace() {
            log::warn!("Font '{font}' has no glyph for {ch:?}");
        }
        let px = size as f32;
        let origin = point(
            (px * X_OFFSET_FACTOR).round(),
            (px * Y_OFFSET_FACTOR).round(),
        );
        let glyph = id.with_scale_and_position(PxScale::from(px), origin);

        // Pas de contour (espace) : bitmap entièrement vierge.
        let Some(outlined) = face.outline_glyph(glyph) else {
            return bitmap;
        };
        let bounds = outlined.px_bounds();
        let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
        let side = i64::from(size);
        let mut coverage = vec![0.0_f32; size as usize * size as usize];
        outlined.draw(|gx, gy, c| {
            let x = left + i64::from(gx);
            let y = top + i64::from(gy);
            if (0..side).contains(&x) && (0..side).contains(&y) {
                coverage[y as usize * size as usize + x as usize] = c;
            }
        });
        ink_from_coverage(size, &coverage)
    }
}

/// Binarize a row-major `size`×`size` coverage map.
///
/// A cell is inked at [`INK_THRESHOLD`], or at [`PEAK_FRACTION`] of the
/// strongest cell when the whole glyph is fainter than that, so a stroke
/// thinner than a pixel still leaves a mark.
fn ink_from_coverage(size: u32, coverage: &[f32]) -> GlyphBitmap {
    let mut bitmap = GlyphBitmap::blank(size);
    let peak = coverage.iter().copied().fold(0.0_f32, f32::max);
    if peak <= 0.0 {
        return bitmap;
    }
    let threshold = INK_THRESHOLD.min(peak * PEAK_FRACTION);
    for (i, &c) in coverage.iter().enumerate() {
        if c > 0.0 && c >= threshold {
            bitmap.ink(i as u32 % size, i as u32 / size);
        }
    }
    bitmap
}

/// Standard font directories for the current platform.
fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from(r"C:\Windows\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

/// Search the system font directories for a file whose stem matches `name`.
#[must_use]
pub fn find_font_file(name: &str) -> Option<PathBuf> {
    let key = face_key(name);
    font_dirs()
        .iter()
        .find_map(|dir| scan_dir(dir, &key, MAX_SCAN_DEPTH))
}

fn scan_dir(dir: &Path, key: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"));
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| face_key(s) == key);
        if is_font && stem_matches {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs
        .iter()
        .find_map(|sub| scan_dir(sub, key, depth - 1))
}
