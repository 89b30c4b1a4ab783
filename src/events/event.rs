//! # Runtime events emitted by the dispatcher and command executors.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Command lifecycle**: admitted, started (permit held), succeeded, failed, panicked
//! - **Control**: ceiling changed/rejected, unknown command
//! - **Shutdown**: shutdown requested, all work finished
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! `CommandAdmitted` events are published in input order, so their `seq` order is
//! the admission order. Completion events carry no ordering promise.
//!
//! ## Example
//! ```rust
//! use pickpoint::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::CommandFailed)
//!     .with_command(7, "accept")
//!     .with_reason("order already exists");
//!
//! assert_eq!(ev.kind, EventKind::CommandFailed);
//! assert_eq!(ev.command_id, Some(7));
//! assert_eq!(ev.command.as_deref(), Some("accept"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Command lifecycle ===
    /// Command entered the outstanding set (executor task spawned).
    ///
    /// Sets: `command_id`, `command`
    CommandAdmitted,

    /// Executor acquired its permit and is about to call collaborators.
    ///
    /// Sets: `command_id`, `command`, `ceiling` (size of the issuing pool)
    CommandStarted,

    /// Command finished without error.
    ///
    /// Sets: `command_id`, `command`
    CommandSucceeded,

    /// Command returned an error (validation, collaborator, arguments).
    ///
    /// Sets: `command_id`, `command`, `reason`
    CommandFailed,

    /// Command panicked; the panic was contained in its executor task.
    ///
    /// Sets: `command_id`, `command`, `reason`
    CommandPanicked,

    /// Command name was not recognised.
    ///
    /// Sets: `command_id`, `command`
    UnknownCommand,

    // === Control ===
    /// Admission pool replaced with a new ceiling.
    ///
    /// Sets: `ceiling` (new value)
    CeilingChanged,

    /// Reconfiguration refused; ceiling unchanged.
    ///
    /// Sets: `ceiling` (unchanged value), `reason`
    CeilingRejected,

    // === Shutdown ===
    /// Shutdown flag raised; the dispatcher stops reading commands.
    ///
    /// Sets: `reason` (`exit`, `end_of_input`, `signal`)
    ShutdownRequested,

    /// Outstanding set drained; dispatcher is stopped.
    AllWorkFinished,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Dispatcher-assigned command number (1-based, input order).
    pub command_id: Option<u64>,
    /// Command name as typed.
    pub command: Option<Arc<str>>,
    /// Human-readable reason (errors, shutdown cause).
    pub reason: Option<Arc<str>>,
    /// Ceiling relevant to the event.
    pub ceiling: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            command_id: None,
            command: None,
            reason: None,
            ceiling: None,
        }
    }

    /// Attaches the command number and name.
    #[inline]
    pub fn with_command(mut self, id: u64, name: impl Into<Arc<str>>) -> Self {
        self.command_id = Some(id);
        self.command = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a ceiling value.
    #[inline]
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// True for events that end a command's execution.
    #[inline]
    pub fn is_command_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::CommandSucceeded
                | EventKind::CommandFailed
                | EventKind::CommandPanicked
                | EventKind::UnknownCommand
        )
    }
}
