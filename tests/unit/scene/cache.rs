use super::*;

fn fp(n: u64) -> FrameFingerprint {
    FrameFingerprint { hi: 0, lo: n }
}

fn frame(w: u32, h: u32) -> Arc<FrameRGBA> {
    Arc::new(FrameRGBA::transparent(w, h))
}

#[test]
fn hit_returns_the_same_allocation() {
    let mut c = FrameCache::new(1024);
    let f = frame(2, 2);
    c.insert(fp(1), Arc::clone(&f));
    let hit = c.lookup(fp(1), (2, 2)).unwrap();
    assert!(Arc::ptr_eq(&hit, &f));
    assert!(c.lookup(fp(2), (2, 2)).is_none());

    let s = c.stats();
    assert_eq!((s.hits, s.misses, s.frames, s.bytes), (1, 1, 1, 16));
}

#[test]
fn resolution_mismatch_drops_the_entry() {
    let mut c = FrameCache::new(1024);
    c.insert(fp(1), frame(4, 4));
    assert!(c.lookup(fp(1), (2, 2)).is_none());
    let s = c.stats();
    assert_eq!((s.stale, s.frames, s.bytes), (1, 0, 0));
    assert!(c.lookup(fp(1), (4, 4)).is_none());
}

#[test]
fn evicts_least_recently_used_first() {
    // Budget fits exactly two 2x2 frames.
    let mut c = FrameCache::new(32);
    c.insert(fp(1), frame(2, 2));
    c.insert(fp(2), frame(2, 2));
    assert!(c.lookup(fp(1), (2, 2)).is_some());
    c.insert(fp(3), frame(2, 2));

    assert!(c.lookup(fp(2), (2, 2)).is_none());
    assert!(c.lookup(fp(1), (2, 2)).is_some());
    assert!(c.lookup(fp(3), (2, 2)).is_some());
    assert_eq!(c.stats().evictions, 1);
    assert_eq!(c.stats().bytes, 32);
}

#[test]
fn oversized_frames_are_not_retained() {
    let mut c = FrameCache::new(8);
    c.insert(fp(1), frame(2, 2));
    assert_eq!(c.stats().frames, 0);
    assert_eq!(c.stats().max_bytes, 8);
}

#[test]
fn reinsert_replaces_without_double_counting() {
    let mut c = FrameCache::new(1024);
    c.insert(fp(1), frame(2, 2));
    c.insert(fp(1), frame(2, 2));
    assert_eq!(c.stats().bytes, 16);
    c.clear();
    assert_eq!(
        c.stats(),
        CacheStats {
            max_bytes: 1024,
            ..CacheStats::default()
        }
    );
}
