use crate::event::error::{EventError, Result};
use crate::event::handler::Handler;
use crate::event::watcher::WatcherContext;
use crate::relay::constants::EVENTS_CAPACITY;
use crate::socket::Endpoint;
use mio::{Events, Interest, Poll, Token};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// What the dispatch trampoline did with one readiness event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The watcher's handler ran.
    Dispatched,
    /// The loop reported an error condition; the handler was not invoked
    /// and the watcher stays registered.
    ErrorSkipped,
    /// No context is registered under the event's token.
    UnknownWatcher,
}

/// Bridges OS-level socket readiness to the registered packet handlers.
///
/// The manager owns the poll and every watcher context. Contexts are looked
/// up through an explicit token-to-context table, so the loop's opaque
/// handle never aliases application state. One dispatch path serves receive,
/// periodic-send, and forward behaviors uniformly.
pub struct EventManager {
    poll: Poll,
    watchers: HashMap<Token, WatcherContext>,
    next_token: usize,
}

impl EventManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            watchers: HashMap::new(),
            next_token: 0,
        })
    }

    /// Wrap an endpoint and handler into a watcher context and register
    /// interest with the loop.
    ///
    /// Watchers are re-armed after every dispatched tick, so registration
    /// behaves as level-triggered: a write-interest watcher fires on
    /// essentially every loop iteration for a UDP socket. The periodic
    /// broadcast handler relies on exactly that.
    pub fn register(
        &mut self,
        endpoint: Endpoint,
        interest: Interest,
        handler: Handler,
        port: u16,
    ) -> Result<Token> {
        let token = Token(self.next_token);
        self.next_token += 1;

        let mut context = WatcherContext::new(endpoint, interest, handler, port);
        context
            .register(self.poll.registry(), token)
            .map_err(EventError::Registration)?;
        debug!(token = token.0, port = port, "Watcher registered");

        self.watchers.insert(token, context);
        Ok(token)
    }

    /// Deregister a watcher and release its context.
    ///
    /// The endpoint is handed back to the caller instead of being closed;
    /// its lifetime belongs to whoever owns the socket from here on.
    pub fn close(&mut self, token: Token) -> Result<Option<Endpoint>> {
        let Some(mut context) = self.watchers.remove(&token) else {
            warn!(token = token.0, "close called for unknown watcher");
            return Ok(None);
        };
        context
            .deregister(self.poll.registry())
            .map_err(EventError::Registration)?;
        debug!(token = token.0, "Watcher closed");
        Ok(Some(context.into_endpoint()))
    }

    pub fn is_registered(&self, token: Token) -> bool {
        self.watchers.contains_key(&token)
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Number of payload bytes the watcher's most recent tick handled.
    pub fn last_len(&self, token: Token) -> Option<usize> {
        self.watchers.get(&token).map(WatcherContext::last_len)
    }

    /// One bounded wait-and-dispatch pass. Returns the number of readiness
    /// events the pass handled.
    pub fn poll_once(&mut self, timeout: Option<Duration>) -> Result<usize> {
        let mut events = Events::with_capacity(EVENTS_CAPACITY);
        if let Err(e) = self.poll.poll(&mut events, timeout) {
            // A signal interrupting the wait is not an error condition.
            if e.kind() == std::io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(e.into());
        }

        let mut handled = 0usize;
        for event in events.iter() {
            self.dispatch(event.token(), event.is_error());
            handled += 1;
        }
        Ok(handled)
    }

    /// Block the calling thread, repeatedly waiting for and dispatching
    /// events. There is no stop condition; the loop runs until the process
    /// is killed.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.poll_once(None)?;
        }
    }

    /// The single trampoline every readiness event funnels through.
    pub(crate) fn dispatch(&mut self, token: Token, is_error: bool) -> DispatchOutcome {
        let Some(context) = self.watchers.get_mut(&token) else {
            warn!(token = token.0, "Readiness event for unknown watcher");
            return DispatchOutcome::UnknownWatcher;
        };

        if is_error {
            // The watcher stays registered; errors never change
            // registration state.
            warn!(
                token = token.0,
                port = context.port(),
                "Error condition on watcher; handler not invoked"
            );
            return DispatchOutcome::ErrorSkipped;
        }

        context.on_ready();
        if let Err(e) = context.rearm(self.poll.registry(), token) {
            warn!(token = token.0, error = %e, "Failed to re-arm watcher");
        }
        DispatchOutcome::Dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket;
    use std::time::Instant;

    fn receiver_manager() -> (EventManager, Token, u16) {
        let endpoint = Endpoint::receiver(0).unwrap();
        let port = endpoint.local_addr().unwrap().port();
        let mut manager = EventManager::new().unwrap();
        let token = manager
            .register(endpoint, Interest::READABLE, Handler::receive(), port)
            .unwrap();
        (manager, token, port)
    }

    #[test]
    fn test_error_event_skips_handler_and_keeps_watcher() {
        let (mut manager, token, _) = receiver_manager();

        let outcome = manager.dispatch(token, true);
        assert_eq!(outcome, DispatchOutcome::ErrorSkipped);
        assert!(manager.is_registered(token));
        assert_eq!(manager.last_len(token), Some(0));
    }

    #[test]
    fn test_unknown_watcher_is_not_fatal() {
        let (mut manager, _, _) = receiver_manager();
        let outcome = manager.dispatch(Token(999), false);
        assert_eq!(outcome, DispatchOutcome::UnknownWatcher);
    }

    #[test]
    fn test_close_returns_endpoint_without_closing_it() {
        let (mut manager, token, port) = receiver_manager();
        assert_eq!(manager.watcher_count(), 1);

        let endpoint = manager.close(token).unwrap().expect("endpoint returned");
        assert!(!manager.is_registered(token));
        assert_eq!(manager.watcher_count(), 0);
        // The socket is still open and still bound.
        assert_eq!(endpoint.local_addr().unwrap().port(), port);

        // Closing again is a logged no-op.
        assert!(manager.close(token).unwrap().is_none());
    }

    #[test]
    fn test_receive_dispatch_records_length() {
        let (mut manager, token, port) = receiver_manager();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender
            .send_to(&[0xDE, 0xAD, 0xBE, 0xEF], ("127.0.0.1", port))
            .unwrap();

        let start = Instant::now();
        let mut handled = 0;
        while handled == 0 && start.elapsed() < Duration::from_secs(2) {
            handled = manager.poll_once(Some(Duration::from_millis(20))).unwrap();
        }
        assert!(handled > 0, "no readiness event within deadline");
        assert_eq!(manager.last_len(token), Some(4));
    }

    #[test]
    fn test_poll_once_times_out_when_idle() {
        let (mut manager, _, _) = receiver_manager();
        let handled = manager.poll_once(Some(Duration::from_millis(20))).unwrap();
        assert_eq!(handled, 0);
    }
}
