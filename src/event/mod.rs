//! Event manager: readiness multiplexing and handler dispatch.

pub mod error;
pub mod handler;
pub mod manager;
pub mod watcher;

pub use error::{EventError, Result};
pub use handler::{BroadcastSender, Forwarder, Handler, ReceivePrinter};
pub use manager::{DispatchOutcome, EventManager};
pub use watcher::WatcherContext;
