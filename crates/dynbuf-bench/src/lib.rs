//! Benchmark workloads for dynbuf.
//!
//! Deterministic, seeded input streams shared by the criterion benches:
//!
//! - [`channel_stream`]: sparse telemetry updates across many channels
//! - [`jittered_timestamps`]: mostly increasing timestamps with late arrivals

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dynbuf_core::{ChannelId, Timestamp};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `len` updates spread uniformly over `num_channels` channels, with values
/// in `[0, 1)`.
pub fn channel_stream(seed: u64, num_channels: u32, len: usize) -> Vec<(ChannelId, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let channel = (rng.next_u64() % u64::from(num_channels.max(1))) as u32;
            let value = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
            (ChannelId(channel), value)
        })
        .collect()
}

/// `len` timestamps counting up from zero, each displaced backwards by up
/// to `max_lag` with probability 1/4. Duplicates are possible.
pub fn jittered_timestamps(seed: u64, len: usize, max_lag: i64) -> Vec<Timestamp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len as i64)
        .map(|t| {
            let r = rng.next_u64();
            if max_lag > 0 && r % 4 == 0 {
                t - ((r >> 2) % max_lag as u64) as i64
            } else {
                t
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_stream_in_range() {
        let stream = channel_stream(7, 16, 1000);
        assert_eq!(stream.len(), 1000);
        for &(ch, v) in &stream {
            assert!(ch.0 < 16, "channel {ch} out of range");
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn streams_are_deterministic() {
        assert_eq!(channel_stream(42, 8, 64), channel_stream(42, 8, 64));
        assert_eq!(
            jittered_timestamps(42, 64, 5),
            jittered_timestamps(42, 64, 5)
        );
    }

    #[test]
    fn jitter_stays_within_lag() {
        let stamps = jittered_timestamps(3, 500, 4);
        for (t, &ts) in stamps.iter().enumerate() {
            let t = t as i64;
            assert!(ts <= t && ts > t - 4, "timestamp {ts} at {t}");
        }
    }

    #[test]
    fn zero_lag_is_monotonic() {
        let stamps = jittered_timestamps(3, 100, 0);
        assert_eq!(stamps, (0..100).collect::<Vec<_>>());
    }
}
