//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher` (admission, control, shutdown), `Executor`
//!   (start/success/failure/panic per command).
//! - **Consumers**: whoever calls [`Bus::subscribe`]; the shell itself does not
//!   depend on delivery.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
