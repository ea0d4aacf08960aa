use crate::transform::value::TransformKey;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5c1e_7a0b_93d4_e2f1;

const TAG_TIME: u8 = 1;
const TAG_VALUE: u8 = 2;
const TAG_COMPOSITION: u8 = 3;
const TAG_EMPTY: u8 = 4;

/// Identity of a layer's (or effect's) content at one local time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContentKey {
    /// Fallback: the raw bits of the local time.
    Time(u64),
    /// Hash of a layer-provided value.
    Value(u64),
    /// Key of a nested composition.
    Composition(Box<CacheKey>),
    /// The layer produces no pixels at this time.
    Empty,
}

impl ContentKey {
    /// Time-based fallback key.
    pub fn time(time: f64) -> Self {
        Self::Time(time.to_bits())
    }

    /// Key derived from any hashable value.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        value.hash(&mut h);
        Self::Value(h.finish())
    }
}

/// One layer's entry in a [`CacheKey`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerKey {
    /// Invisible layer: contributes nothing.
    Hidden,
    /// Visible layer snapshot.
    Visible {
        /// Placement snapshot.
        transform: TransformKey,
        /// Content identity.
        content: ContentKey,
        /// Effect identities, in application order; `None` without effects.
        effects: Option<SmallVec<[ContentKey; 2]>>,
    },
}

/// Structural identity of a composition frame.
///
/// One entry per layer in render order; `None` marks a layer outside its active window.
/// Equal keys imply pixel-identical frames.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Full-resolution canvas size.
    pub canvas: (u32, u32),
    /// Preview downscale factor.
    pub preview_level: u32,
    /// Per-layer entries.
    pub layers: Vec<Option<LayerKey>>,
}

impl CacheKey {
    /// Stable 128-bit digest used as the frame cache index.
    pub fn fingerprint(&self) -> FrameFingerprint {
        let mut h = StableHasher::new();
        write_cache_key(&mut h, self);
        h.finish()
    }
}

/// 128-bit digest of a [`CacheKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_cache_key(h: &mut StableHasher, key: &CacheKey) {
    h.write_u8(TAG_COMPOSITION);
    h.write_u32(key.canvas.0);
    h.write_u32(key.canvas.1);
    h.write_u32(key.preview_level);
    h.write_u32(key.layers.len() as u32);
    for layer in &key.layers {
        match layer {
            None => h.write_u8(0),
            Some(LayerKey::Hidden) => h.write_u8(1),
            Some(LayerKey::Visible {
                transform,
                content,
                effects,
            }) => {
                h.write_u8(2);
                write_transform_key(h, transform);
                write_content_key(h, content);
                match effects {
                    None => h.write_u8(0),
                    Some(effects) => {
                        h.write_u8(1);
                        h.write_u32(effects.len() as u32);
                        for e in effects {
                            write_content_key(h, e);
                        }
                    }
                }
            }
        }
    }
}

fn write_transform_key(h: &mut StableHasher, key: &TransformKey) {
    for b in key.bits {
        h.write_u64(b);
    }
    h.write_u8(key.origin_point.tag());
    h.write_u8(key.blend_mode.tag());
}

fn write_content_key(h: &mut StableHasher, key: &ContentKey) {
    match key {
        ContentKey::Time(bits) => {
            h.write_u8(TAG_TIME);
            h.write_u64(*bits);
        }
        ContentKey::Value(v) => {
            h.write_u8(TAG_VALUE);
            h.write_u64(*v);
        }
        ContentKey::Composition(nested) => write_cache_key(h, nested),
        ContentKey::Empty => h.write_u8(TAG_EMPTY),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/key.rs"]
mod tests;
