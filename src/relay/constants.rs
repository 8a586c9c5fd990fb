//! Constants used throughout the relay.

/// Capacity of each watcher's receive/transmit scratch buffer in bytes.
/// Datagrams larger than this are truncated by the receive call.
pub const BUFFER_LEN: usize = 5000;

/// Delay between broadcast transmissions in microseconds.
pub const TX_DELAY_US: u64 = 1_000_000;

/// Fixed test payload for broadcast transmission. The terminator byte is
/// never transmitted.
pub const TEST_PAYLOAD: &[u8] = b"BROADCAST-BROADCAST-BROADCAST";

/// Payload bytes rendered per hex-dump line.
pub const BYTES_PER_LINE: usize = 8;

/// Readiness events drained per poll pass.
pub const EVENTS_CAPACITY: usize = 64;
