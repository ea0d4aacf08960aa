use crate::render::frame::FrameRGBA;
use crate::scene::key::FrameFingerprint;
use indexmap::IndexMap;
use std::sync::Arc;

/// Default byte budget of a composition's frame cache (1 GiB).
pub const DEFAULT_CACHE_MAX_BYTES: usize = 1 << 30;

/// Counters describing a [`FrameCache`]'s behavior since creation (or the last clear).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that required rendering.
    pub misses: u64,
    /// Entries dropped to stay under the byte budget.
    pub evictions: u64,
    /// Entries dropped because the stored resolution no longer matched.
    pub stale: u64,
    /// Frames currently retained.
    pub frames: usize,
    /// Pixel bytes currently retained.
    pub bytes: usize,
    /// Byte budget.
    pub max_bytes: usize,
}

/// Byte-bounded LRU of rendered frames indexed by key fingerprint.
///
/// Insertion order of the map doubles as recency order: a hit moves its entry to the back,
/// eviction pops from the front.
#[derive(Debug)]
pub(crate) struct FrameCache {
    entries: IndexMap<FrameFingerprint, Arc<FrameRGBA>>,
    max_bytes: usize,
    stats: CacheStats,
}

impl FrameCache {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_bytes,
            stats: CacheStats::default(),
        }
    }

    /// Return the cached frame for `key` if its resolution is `size`.
    ///
    /// An entry whose resolution differs is stale and is dropped.
    pub(crate) fn lookup(&mut self, key: FrameFingerprint, size: (u32, u32)) -> Option<Arc<FrameRGBA>> {
        let Some(frame) = self.entries.shift_remove(&key) else {
            self.stats.misses += 1;
            return None;
        };
        if frame.size() != size {
            tracing::debug!(
                cached = ?frame.size(),
                wanted = ?size,
                "dropping stale cache entry"
            );
            self.stats.bytes -= frame.data.len();
            self.stats.stale += 1;
            self.stats.misses += 1;
            return None;
        }
        self.stats.hits += 1;
        tracing::trace!(hi = key.hi, lo = key.lo, "frame cache hit");
        self.entries.insert(key, Arc::clone(&frame));
        Some(frame)
    }

    pub(crate) fn insert(&mut self, key: FrameFingerprint, frame: Arc<FrameRGBA>) {
        let bytes = frame.data.len();
        if bytes > self.max_bytes {
            tracing::trace!(bytes, max = self.max_bytes, "frame exceeds cache budget");
            return;
        }
        if let Some(old) = self.entries.shift_remove(&key) {
            self.stats.bytes -= old.data.len();
        }
        while self.stats.bytes + bytes > self.max_bytes {
            let Some((_, old)) = self.entries.shift_remove_index(0) else {
                break;
            };
            self.stats.bytes -= old.data.len();
            self.stats.evictions += 1;
            tracing::trace!(freed = old.data.len(), "evicted cached frame");
        }
        self.entries.insert(key, frame);
        self.stats.bytes += bytes;
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            frames: self.entries.len(),
            max_bytes: self.max_bytes,
            ..self.stats
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/cache.rs"]
mod tests;
