//! # pickpoint
//!
//! **Pickpoint** is an interactive shell for a parcel pick-up point. Operators
//! type one command per line; every command runs as its own task, and a
//! runtime-adjustable ceiling bounds how many execute at once.
//!
//! ## Architecture
//! ```text
//!   stdin ──► [command-source thread] ──► mpsc ──┐
//!                                                ▼
//!   SIGINT/SIGTERM ──► signal monitor ──► CancellationToken ──► Dispatcher
//!                                                   ▲           │  ├─ set_mg → Admission::reconfigure
//!                                          exit / EOF ┘           │  └─ other  → TaskTracker::spawn
//!                                                               ▼
//!                                             ┌──────────────────────────────┐
//!                                             │ Executor::run (one per line) │
//!                                             │  ├─ Admission::acquire       │
//!                                             │  ├─ ValidationService        │
//!                                             │  ├─ OrderService ──► Storage │
//!                                             │  └─ drop(permit)             │
//!                                             └──────────────┬───────────────┘
//!                                                            ▼
//!                                                  Bus (broadcast events)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Running ──(exit | end of input | signal)──► Draining ──(tracker empty)──► Stopped
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                                  |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Dispatch**      | Command loop, drain on shutdown.                         | [`Dispatcher`], [`DispatcherBuilder`]      |
//! | **Admission**     | Replaceable permit pool behind the concurrency ceiling.  | [`Admission`], [`Permit`]                  |
//! | **Collaborators** | Validation and order logic the executor calls.           | [`ValidationService`], [`OrderService`]    |
//! | **Storage**       | Order persistence.                                       | [`Storage`], [`MemoryStorage`]             |
//! | **Events**        | Lifecycle events for embedders and tests.                | [`Bus`], [`Event`], [`EventKind`]          |
//! | **Errors**        | Typed errors per layer.                                  | [`ShellError`], [`ServiceError`]           |
//! | **Configuration** | Runtime settings.                                        | [`Config`]                                 |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pickpoint::{Config, Console, Dispatcher, MemoryStorage, OrderManager, Storage, Validator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         max_concurrent: 2,
//!         hash_delay: Duration::ZERO,
//!         ..Config::default()
//!     };
//!     let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
//!     let (console, _captured) = Console::capture();
//!
//!     let dispatcher = Dispatcher::builder(cfg.clone())
//!         .with_console(console)
//!         .build(
//!             Arc::new(OrderManager::new(Arc::clone(&storage), &cfg)),
//!             Arc::new(Validator::new(storage, &cfg)),
//!         );
//!
//!     let input = std::io::Cursor::new("help\nset_mg -n=4\nexit\n");
//!     let lines = pickpoint::spawn_line_reader(input, cfg.command_queue_clamped())?;
//!     let summary = dispatcher.run(lines).await;
//!     assert_eq!(summary.ceiling, 4);
//!     Ok(())
//! }
//! ```
mod commands;
mod config;
mod console;
mod core;
mod error;
mod events;
mod service;
pub mod telemetry;

// ---- Public re-exports ----

pub use commands::{CATALOG, CommandInfo, Flags, Input, Invocation, Operation, help_table};
pub use config::{Config, LogFormat};
pub use console::{Captured, Console};
pub use core::{
    Admission, Dispatcher, DispatcherBuilder, DispatcherState, Executor, Permit, RunSummary,
    ShutdownSignals, parse_ceiling, spawn_line_reader, spawn_signal_monitor, stdin_lines,
};
pub use error::{ArgsError, ServiceError, ShellError};
pub use events::{Bus, Event, EventKind};
pub use service::{
    AcceptRequest, MemoryStorage, Order, OrderManager, OrderService, PackageType, Page, Progress,
    Storage, ValidationService, Validator, render_orders,
};
