use crate::relay::constants::{TEST_PAYLOAD, TX_DELAY_US};
use crate::socket::{self, hex_dump, Endpoint, Transport};
use colored::Colorize;
use std::net::SocketAddrV4;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// The closed set of per-tick behaviors a watcher can carry.
///
/// Every variant is invoked through the same dispatch path and must tolerate
/// being called on every readiness tick, including the deliberately noisy
/// write-ready case.
pub enum Handler {
    /// Print every received datagram as a hex dump.
    Receive(ReceivePrinter),
    /// Send the fixed test payload on every write-ready tick, then stall.
    Broadcast(BroadcastSender),
    /// Relay received datagrams verbatim to a second endpoint.
    Forward(Forwarder),
}

impl Handler {
    pub fn receive() -> Self {
        Handler::Receive(ReceivePrinter)
    }

    pub fn broadcast(port: u16) -> Self {
        Handler::Broadcast(BroadcastSender::new(port))
    }

    pub fn forward(transmitter: Endpoint, dest: SocketAddrV4, verbose: bool) -> Self {
        Handler::Forward(Forwarder::new(transmitter, dest, verbose))
    }

    /// Process one readiness tick given the watcher's public fields.
    ///
    /// Returns the number of payload bytes the tick handled; an abandoned
    /// tick reports zero.
    pub fn on_ready(&mut self, endpoint: &Endpoint, port: u16, buffer: &mut [u8]) -> usize {
        match self {
            Handler::Receive(handler) => handler.on_ready(endpoint, buffer),
            Handler::Broadcast(handler) => handler.on_ready(endpoint, port),
            Handler::Forward(handler) => handler.on_ready(endpoint, port, buffer),
        }
    }
}

/// Receive-and-print: one `recv_from` per read-ready tick, rendered to the
/// operator console.
pub struct ReceivePrinter;

impl ReceivePrinter {
    fn on_ready(&mut self, endpoint: &Endpoint, buffer: &mut [u8]) -> usize {
        let (len, src) = match endpoint.recv_from(buffer) {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "recv_from failed; abandoning tick");
                return 0;
            }
        };

        println!("{}", ">>> RECEIVED UDP MESSAGE >>>".green().bold());
        println!("{}", hex_dump(&buffer[..len]));
        debug!(bytes = len, src = %src, "Datagram received");
        len
    }
}

/// Periodic broadcast transmitter.
///
/// A write-interest watcher on a UDP socket fires on essentially every loop
/// iteration, so pacing comes from the sleep at the end of each tick. The
/// sleep stalls the entire single-threaded loop for its duration; that
/// whole-loop stall is the rate limiter, not a timer. Receive watchers on
/// other sockets are starved for the same interval.
pub struct BroadcastSender {
    dest: SocketAddrV4,
    delay: Duration,
}

impl BroadcastSender {
    pub fn new(port: u16) -> Self {
        Self {
            dest: socket::address::broadcast(port),
            delay: Duration::from_micros(TX_DELAY_US),
        }
    }

    fn on_ready(&mut self, endpoint: &Endpoint, port: u16) -> usize {
        println!(
            "{} sending test[{}] = {}",
            format!(">>> BROADCAST TEST (port = {}) >>>", port)
                .yellow()
                .bold(),
            TEST_PAYLOAD.len(),
            String::from_utf8_lossy(TEST_PAYLOAD)
        );

        let sent = match socket::send(self.dest, endpoint, TEST_PAYLOAD) {
            Ok(sent) => {
                debug!(bytes_sent = sent, dest = %self.dest, "Broadcast sent");
                sent
            }
            Err(e) => {
                warn!(error = %e, dest = %self.dest, "Broadcast send failed");
                0
            }
        };

        thread::sleep(self.delay);
        sent
    }
}

/// Receive-and-forward: a byte-for-byte network-to-application relay.
///
/// The watcher's endpoint is the network-side receiver; the transmitter held
/// here is an independently owned application-side endpoint used only for
/// sending.
pub struct Forwarder {
    transmitter: Endpoint,
    dest: SocketAddrV4,
    verbose: bool,
}

impl Forwarder {
    pub fn new(transmitter: Endpoint, dest: SocketAddrV4, verbose: bool) -> Self {
        Self {
            transmitter,
            dest,
            verbose,
        }
    }

    fn on_ready(&mut self, endpoint: &Endpoint, port: u16, buffer: &mut [u8]) -> usize {
        let (len, _src) = match endpoint.recv_from(buffer) {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "recv_from failed; abandoning tick");
                return 0;
            }
        };

        // No transformation, validation, or framing. A failed forward is
        // logged and dropped; the datagram is not retried.
        let forwarded = match socket::send(self.dest, &self.transmitter, &buffer[..len]) {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, dest = %self.dest, "Forward send failed");
                0
            }
        };

        if self.verbose {
            println!(
                ">>> fwd(net:{}>app:{}) = {}",
                port,
                self.dest.port(),
                forwarded
            );
            println!("{}", hex_dump(&buffer[..len]));
        }
        len
    }
}
