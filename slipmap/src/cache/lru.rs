//! Bounded LRU cache over tile coordinates.

use super::{CacheStats, TileCache};
use crate::coord::TileCoord;
use crate::style::PreparedTile;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Default number of prepared tiles retained.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug)]
struct Entry {
    tile: Arc<PreparedTile>,
    /// Monotonic access tick for LRU ordering.
    last_access: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<TileCoord, Entry>,
    tick: u64,
    stats: CacheStats,
}

impl Inner {
    fn touch(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Remove least-recently-used entries until under `capacity`.
    fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() >= capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(coord, _)| *coord)
            else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            debug!(tile = %oldest, "evicted prepared tile");
        }
    }
}

/// In-memory prepared-tile cache with LRU eviction.
///
/// Bounded by entry count; recency is a monotonic access counter bumped on
/// every hit and insert.
#[derive(Debug)]
pub struct LruTileCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl LruTileCache {
    /// Create a cache retaining at most `capacity` tiles (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of retained tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LruTileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TileCache for LruTileCache {
    fn get(&self, coord: &TileCoord) -> Option<Arc<PreparedTile>> {
        let mut guard = self.inner.lock().expect("cache lock poisoned");
        let inner = &mut *guard;
        let tick = inner.touch();
        match inner.entries.get_mut(coord) {
            Some(entry) => {
                entry.last_access = tick;
                inner.stats.hits += 1;
                Some(Arc::clone(&entry.tile))
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    fn insert(&self, coord: TileCoord, tile: Arc<PreparedTile>) {
        let mut guard = self.inner.lock().expect("cache lock poisoned");
        let inner = &mut *guard;
        let tick = inner.touch();
        if !inner.entries.contains_key(&coord) {
            inner.evict_to(self.capacity);
        }
        inner.entries.insert(
            coord,
            Entry {
                tile,
                last_access: tick,
            },
        );
        inner.stats.entries = inner.entries.len();
    }

    fn contains(&self, coord: &TileCoord) -> bool {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.contains_key(coord)
    }

    fn len(&self) -> usize {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.len()
    }

    fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.clear();
        inner.stats.entries = 0;
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache lock poisoned");
        let mut stats = inner.stats.clone();
        stats.entries = inner.entries.len();
        stats
    }
}
