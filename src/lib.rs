//! Axon - event-driven UDP relay and broadcast tester
//!
//! This library wires raw UDP sockets into a single-threaded readiness loop
//! and dispatches each notification to one of three packet handlers:
//! receive-and-print, periodic broadcast transmission, or verbatim
//! network-to-application forwarding.

pub mod event;
pub mod relay;
pub mod socket;
