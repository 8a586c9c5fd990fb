use crate::event::handler::Handler;
use crate::relay::constants::BUFFER_LEN;
use crate::socket::Endpoint;
use mio::event::Source;
use mio::{Interest, Registry, Token};

/// Per-registration state bridging one readiness event source to its
/// handler.
///
/// Exactly one context exists per registered endpoint; the event manager
/// owns it exclusively and it never crosses a thread boundary. The scratch
/// buffer bounds the largest datagram handled in one tick; anything larger
/// is silently truncated by the underlying receive call.
pub struct WatcherContext {
    endpoint: Endpoint,
    interest: Interest,
    port: u16,
    buffer: Box<[u8]>,
    last_len: usize,
    handler: Handler,
}

impl WatcherContext {
    pub(crate) fn new(endpoint: Endpoint, interest: Interest, handler: Handler, port: u16) -> Self {
        Self {
            endpoint,
            interest,
            port,
            buffer: vec![0u8; BUFFER_LEN].into_boxed_slice(),
            last_len: 0,
            handler,
        }
    }

    /// Run the handler for one readiness tick, recording how many bytes the
    /// tick processed.
    pub(crate) fn on_ready(&mut self) {
        self.last_len = self
            .handler
            .on_ready(&self.endpoint, self.port, &mut self.buffer);
    }

    /// Number of payload bytes the most recent tick handled.
    pub fn last_len(&self) -> usize {
        self.last_len
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn register(&mut self, registry: &Registry, token: Token) -> std::io::Result<()> {
        self.endpoint.register(registry, token, self.interest)
    }

    /// Re-arm interest with the poll so the next iteration reports this
    /// watcher again while the readiness condition still holds. This is what
    /// gives registrations level-triggered behavior on top of mio's
    /// edge-triggered notifications.
    pub(crate) fn rearm(&mut self, registry: &Registry, token: Token) -> std::io::Result<()> {
        self.endpoint.reregister(registry, token, self.interest)
    }

    pub(crate) fn deregister(&mut self, registry: &Registry) -> std::io::Result<()> {
        self.endpoint.deregister(registry)
    }

    pub(crate) fn into_endpoint(self) -> Endpoint {
        self.endpoint
    }
}
