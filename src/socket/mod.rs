//! Socket factory: raw UDP endpoints, destination addresses, and the
//! best-effort send primitive.

pub mod address;
pub mod endpoint;
pub mod error;
pub mod hexdump;

pub use endpoint::{send, Endpoint, Transport};
pub use error::{Result, Severity, SocketError};
pub use hexdump::hex_dump;
