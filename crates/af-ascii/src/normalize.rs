//! Brightness normalisation over the active character set.

use crate::catalog::GlyphCatalog;

/// Rescaled brightness for each character of one active set.
///
/// Entries are kept in character-code order; [`BrightnessMap::iter`] therefore
/// yields the canonical scan order used for tie-breaking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrightnessMap {
    entries: Vec<(char, f64)>,
}

impl BrightnessMap {
    #[must_use]
    pub fn get(&self, ch: char) -> Option<f64> {
        self.entries
            .binary_search_by(|(c, _)| c.cmp(&ch))
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Character whose brightness is closest to `value`.
    ///
    /// Scans in code order and only replaces the best on a strictly smaller
    /// distance, so exact ties go to the lowest code. `None` when empty.
    #[must_use]
    pub fn nearest(&self, value: f64) -> Option<char> {
        let mut best: Option<(char, f64)> = None;
        for (ch, brightness) in self.iter() {
            let distance = (brightness - value).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((ch, distance));
            }
        }
        best.map(|(ch, _)| ch)
    }
}

/// Rescale the raw brightness of `chars` so the set spans [0, 1].
///
/// Characters not yet cataloged are measured first. With a degenerate range
/// (one character, or identical brightness everywhere) every character maps
/// to the shared minimum raw value, not to 0.5.
///
/// The result depends only on set membership: order and duplicates in
/// `chars` are irrelevant.
pub fn normalize(catalog: &mut GlyphCatalog, font: &str, chars: &[char]) -> BrightnessMap {
    let mut sorted = chars.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let raw: Vec<(char, f64)> = sorted
        .into_iter()
        .map(|c| (c, catalog.ensure(c, font)))
        .collect();

    let (min, max) = raw
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| {
            (lo.min(v), hi.max(v))
        });

    let entries = raw
        .into_iter()
        .map(|(c, v)| {
            let scaled = if max > min { (v - min) / (max - min) } else { min };
            (c, scaled)
        })
        .collect();
    BrightnessMap { entries }
}
