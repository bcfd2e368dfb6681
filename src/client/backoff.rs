//! Retry and backoff policies for leader discovery.
//!
//! Connection attempts against a single endpoint use a bounded `backon`
//! policy; the routing loop itself is unbounded (the caller's contract is
//! "block until the cluster answers") and paces its iterations with
//! [`routing_delay`].

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::constants::{ROUTING_BACKOFF_BASE_MS, ROUTING_BACKOFF_CAP_MS};

/// Policy for connecting to one endpoint.
///
/// Characteristics:
/// - Short initial delay (20ms); a refused connect rarely heals in less
/// - Few retries (2) before the engine moves to the next candidate
/// - Includes jitter to prevent thundering herd after a leader crash
pub fn connect_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(20))
        .with_max_delay(Duration::from_millis(250))
        .with_max_times(2)
        .with_jitter()
}

/// Delay before the `attempt`-th consecutive routing retry (reconnects and
/// `NOT_LEADER` redirects). Exponential from the base, capped.
pub fn routing_delay(attempt: u32) -> Duration {
    let exp = attempt.min(16);
    let ms = ROUTING_BACKOFF_BASE_MS
        .saturating_mul(1u64 << exp)
        .min(ROUTING_BACKOFF_CAP_MS);
    Duration::from_millis(ms)
}
