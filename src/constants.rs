//! Centralized protocol and configuration constants.
//!
//! # Categories
//!
//! - **Protocol Constants**: wire header sizes and parsing limits
//! - **Network Constants**: frame and connection limits
//! - **Routing Constants**: leader-discovery backoff parameters

// =============================================================================
// Protocol Constants
// =============================================================================

/// Size of the version-1 request header: `[version:u8][op_code:u8]`.
pub const REQUEST_HEADER_SIZE: usize = 2;

/// Size of the version-1 response header: `[status:u8]`.
pub const RESPONSE_HEADER_SIZE: usize = 1;

/// Upper bound on the element count a wire array may declare.
///
/// The count prefix arrives before the elements do, so a corrupt or hostile
/// frame could announce a u32's worth of servers or chunks and drive the
/// parser into allocating for all of them. No real configuration or
/// directory listing comes anywhere near 100,000 entries; a count above
/// that is treated as a parse failure.
pub const MAX_PROTOCOL_ARRAY_SIZE: u32 = 100_000;

// =============================================================================
// Network Constants
// =============================================================================

/// Maximum size of a single framed message (16 MB).
///
/// A frame claiming to be larger than this is treated as a protocol error
/// rather than buffered.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Seconds to wait for a TCP connect before treating the endpoint as down.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Routing Constants
// =============================================================================

/// Base delay between leader-discovery retries (doubles per consecutive
/// failure).
pub const ROUTING_BACKOFF_BASE_MS: u64 = 20;

/// Ceiling on the leader-discovery retry delay.
pub const ROUTING_BACKOFF_CAP_MS: u64 = 1_000;
