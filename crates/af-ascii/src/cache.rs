//! Resolution Cache: tile size -> per-tile brightness grid.

use std::sync::Arc;

use af_core::frame::BrightnessGrid;

/// Capacité par défaut du cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 12;

struct CacheEntry {
    tile_size: u32,
    grid: Arc<BrightnessGrid>,
}

/// Fixed-capacity ring buffer of brightness grids keyed by tile size.
///
/// At most one entry per tile size. Once full, each new size overwrites the
/// oldest insertion. Lookups scan linearly, which is fine at this capacity.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use af_ascii::cache::ResolutionCache;
/// use af_core::frame::BrightnessGrid;
///
/// let mut cache = ResolutionCache::new(2);
/// let grid = Arc::new(BrightnessGrid::from_values(1, 1, vec![0.5]).unwrap());
/// for size in [4, 8, 16] {
///     cache.store(size, Arc::clone(&grid));
/// }
/// assert!(cache.lookup(4).is_none());
/// assert!(cache.lookup(16).is_some());
/// ```
pub struct ResolutionCache {
    slots: Vec<CacheEntry>,
    capacity: usize,
    cursor: usize,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResolutionCache {
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "resolution cache capacity must be positive");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, tile_size: u32) -> Option<Arc<BrightnessGrid>> {
        self.slots
            .iter()
            .find(|e| e.tile_size == tile_size)
            .map(|e| Arc::clone(&e.grid))
    }

    /// Insert `grid` for `tile_size`. No-op (returns false) if already cached.
    pub fn store(&mut self, tile_size: u32, grid: Arc<BrightnessGrid>) -> bool {
        if self.slots.iter().any(|e| e.tile_size == tile_size) {
            return false;
        }
        let entry = CacheEntry { tile_size, grid };
        if self.slots.len() < self.capacity {
            self.slots.push(entry);
        } else {
            log::debug!(
                "Evicting tile size {} from resolution cache",
                self.slots[self.cursor].tile_size
            );
            self.slots[self.cursor] = entry;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
        true
    }
}
