//! Dispatch core: admission, command loop, execution and lifecycle.
//!
//! Internal modules:
//! - [`admission`]: replaceable permit pool behind the concurrency ceiling;
//! - [`dispatcher`]: command loop, control commands, drain on shutdown;
//! - [`executor`]: one admitted command against the collaborators;
//! - [`builder`]: wiring of the above;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`source`]: line reader over stdin or any `BufRead`.

mod admission;
mod builder;
mod dispatcher;
mod executor;
mod shutdown;
mod source;

pub use admission::{Admission, Permit, parse_ceiling};
pub use builder::DispatcherBuilder;
pub use dispatcher::{Dispatcher, DispatcherState, RunSummary};
pub use executor::Executor;
pub use shutdown::{ShutdownSignals, spawn_signal_monitor};
pub use source::{spawn_line_reader, stdin_lines};
