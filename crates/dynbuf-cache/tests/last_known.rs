//! Integration test: last-known-value cache driven like a telemetry feed.

use dynbuf_cache::{CacheConfig, LastKnownValueCache, OrderingPolicy};
use dynbuf_core::{BufferError, ChannelId, Sequence};

#[test]
fn sparse_updates_forward_fill() {
    let mut cache = LastKnownValueCache::new(3, 0.0f64).unwrap();
    cache.update(ChannelId(1), 42.0).unwrap();
    assert_eq!(cache.snapshot(), vec![0.0, 42.0, 0.0]);
}

#[test]
fn out_of_range_channel_rejected() {
    let mut cache = LastKnownValueCache::new(3, 0.0f64).unwrap();
    let err = cache.update(ChannelId(5), 1.0).unwrap_err();
    assert!(matches!(err, BufferError::InvalidChannel { .. }));
    assert_eq!(cache.snapshot(), vec![0.0; 3]);
}

#[test]
fn interleaved_feed_keeps_latest_per_channel() {
    let mut cache = LastKnownValueCache::new(4, f64::NAN).unwrap();
    let feed = [(0, 1.0), (2, 5.0), (0, 2.0), (3, -1.0), (2, 6.0), (0, 3.0)];
    for (ch, v) in feed {
        cache.update(ChannelId(ch), v).unwrap();
    }

    let snap = cache.snapshot();
    assert_eq!(snap[0], 3.0);
    assert!(snap[1].is_nan());
    assert_eq!(snap[2], 6.0);
    assert_eq!(snap[3], -1.0);

    assert_eq!(cache.value_of(ChannelId(0)).unwrap().1, Sequence(3));
    assert_eq!(cache.value_of(ChannelId(1)).unwrap().1, Sequence::ZERO);
}

#[test]
fn snapshot_view_stays_valid_across_updates() {
    let mut cache = LastKnownValueCache::new(2, 0i64).unwrap();
    let view = cache.snapshot_view();
    cache.update(ChannelId(0), 9).unwrap();
    assert!(view.is_current(cache.store()));
    assert_eq!(view.len(), 2);
}

#[test]
fn rejecting_policy_drops_stale_updates() {
    let config = CacheConfig::new(1, 0.0f64).with_ordering(OrderingPolicy::RejectOlder);
    let mut cache = LastKnownValueCache::with_config(&config).unwrap();
    cache.update_at(ChannelId(0), 1.0, 100).unwrap();
    let err = cache.update_at(ChannelId(0), 2.0, 50).unwrap_err();
    assert!(matches!(err, BufferError::StaleUpdate { .. }));
    assert_eq!(cache.value_of(ChannelId(0)).unwrap().0, 1.0);
}
