//! Destination address construction.
//!
//! Three kinds of IPv4 destinations exist: the limited-broadcast address
//! (used with broadcast-enabled endpoints), the wildcard address (a bind
//! target only, never a send target), and explicit unicast (the forwarding
//! destination). Addresses are immutable once constructed.

use crate::socket::error::{Result, SocketError};
use std::net::{Ipv4Addr, SocketAddrV4};
use tracing::debug;

/// Limited-broadcast destination (`255.255.255.255`) for the given port.
pub fn broadcast(port: u16) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::BROADCAST, port)
}

/// Wildcard address (`0.0.0.0`) for the given port.
pub fn any(port: u16) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)
}

/// Explicit unicast destination.
///
/// Fails with a fatal error if `host` is not an IPv4 literal; no partially
/// constructed address is ever returned.
pub fn unicast(host: &str, port: u16) -> Result<SocketAddrV4> {
    let ip: Ipv4Addr = host
        .parse()
        .map_err(|_| SocketError::BadAddress(host.to_string()))?;
    debug!(host = host, port = port, "Resolved unicast destination");
    Ok(SocketAddrV4::new(ip, port))
}
