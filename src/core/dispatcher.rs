//! # Dispatcher: the command loop and its drain.
//!
//! ```text
//!            ┌──────────── Running ─────────────┐
//!            │ select! (biased)                 │
//!            │   shutdown.cancelled() ──────────┼──► reason = signal
//!            │   lines.recv()                   │
//!            │     ├─ None      → cancel ───────┼──► reason = end_of_input
//!            │     ├─ exit      → cancel ───────┼──► reason = exit
//!            │     ├─ set_mg    → reconfigure   │
//!            │     ├─ blank     → skip          │
//!            │     └─ other     → tracker.spawn(executor.run)
//!            └──────────────────────────────────┘
//!                              │
//!                              ▼
//!            Draining: drop(lines); tracker.close(); tracker.wait()
//!                              │
//!                              ▼
//!            Stopped:  "All work finished. Exiting..."
//! ```
//!
//! ## Rules
//! - Spawning never waits for a permit; executors acquire their own.
//! - Commands enter the outstanding set in input order; they finish in any order.
//! - Once draining, nothing else is read from the source.
//! - The shutdown branch is polled first, so a raised flag wins over a ready line.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::commands::{Flags, Input, Invocation, SET_CEILING};
use crate::console::Console;
use crate::error::ShellError;
use crate::events::{Bus, Event, EventKind};

use super::admission::{Admission, parse_ceiling};
use super::executor::Executor;

/// Lifecycle of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Reading and admitting commands.
    Running,
    /// Shutdown flag raised; waiting for admitted commands.
    Draining,
    /// Outstanding set empty. Terminal.
    Stopped,
}

/// Outcome of one [`Dispatcher::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands handed to an executor.
    pub admitted: u64,
    /// Ceiling at the time the dispatcher stopped.
    pub ceiling: usize,
    /// What raised the shutdown flag: `exit`, `end_of_input` or `signal`.
    pub reason: &'static str,
}

/// Reads command lines and fans them out to executor tasks.
pub struct Dispatcher {
    admission: Arc<Admission>,
    executor: Arc<Executor>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    bus: Bus,
    console: Console,
    state: watch::Sender<DispatcherState>,
}

impl Dispatcher {
    pub(crate) fn new_internal(
        admission: Arc<Admission>,
        executor: Arc<Executor>,
        shutdown: CancellationToken,
        bus: Bus,
        console: Console,
    ) -> Self {
        let (state, _rx) = watch::channel(DispatcherState::Running);
        Self {
            admission,
            executor,
            tracker: TaskTracker::new(),
            shutdown,
            bus,
            console,
            state,
        }
    }

    /// Shared admission controller.
    pub fn admission(&self) -> &Arc<Admission> {
        &self.admission
    }

    /// The shutdown flag. Cancelling it has the same effect as `exit`.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Event bus fed by the dispatcher and its executors.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Watch handle over the dispatcher state.
    pub fn state(&self) -> watch::Receiver<DispatcherState> {
        self.state.subscribe()
    }

    /// Runs until shutdown, then drains every admitted command.
    pub async fn run(self, mut lines: mpsc::Receiver<String>) -> RunSummary {
        info!(ceiling = self.admission.ceiling(), "dispatcher running");
        let mut admitted = 0u64;

        let reason = loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break "signal",
                line = lines.recv() => {
                    let Some(line) = line else {
                        self.shutdown.cancel();
                        break "end_of_input";
                    };
                    match Input::parse(&line) {
                        None => continue,
                        Some(Input::Exit) => {
                            self.shutdown.cancel();
                            break "exit";
                        }
                        Some(Input::SetCeiling(args)) => self.set_ceiling(&args).await,
                        Some(Input::Invoke(inv)) => {
                            admitted += 1;
                            self.admit(admitted, inv);
                        }
                    }
                }
            }
        };

        drop(lines);
        self.drain(reason).await;

        RunSummary {
            admitted,
            ceiling: self.admission.ceiling(),
            reason,
        }
    }

    fn admit(&self, id: u64, inv: Invocation) {
        debug!(worker = id, command = %inv.name, "admitting command");
        self.bus
            .publish(Event::new(EventKind::CommandAdmitted).with_command(id, inv.name.as_str()));
        let executor = Arc::clone(&self.executor);
        self.tracker.spawn(async move { executor.run(id, inv).await });
    }

    async fn set_ceiling(&self, args: &[String]) {
        match self.try_set_ceiling(args).await {
            Ok((prev, next)) => {
                info!(prev, next, "concurrency ceiling changed");
                self.bus
                    .publish(Event::new(EventKind::CeilingChanged).with_ceiling(next));
                self.console
                    .print(&format!("Number of concurrent commands set to {next}"));
            }
            Err(e) => {
                let current = self.admission.ceiling();
                warn!(kind = e.as_label(), error = %e, ceiling = current, "reconfiguration rejected");
                self.bus.publish(
                    Event::new(EventKind::CeilingRejected)
                        .with_ceiling(current)
                        .with_reason(e.to_string()),
                );
                self.console.print(&e.to_string());
            }
        }
    }

    async fn try_set_ceiling(&self, args: &[String]) -> Result<(usize, usize), ShellError> {
        let flags = Flags::parse(SET_CEILING, &["n"], args)?;
        let next = parse_ceiling(flags.get("n"))?;
        let prev = self.admission.reconfigure(next).await?;
        Ok((prev, next))
    }

    async fn drain(&self, reason: &'static str) {
        self.state.send_replace(DispatcherState::Draining);
        info!(reason, outstanding = self.tracker.len(), "shutdown requested; draining");
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));

        self.tracker.close();
        self.tracker.wait().await;

        self.state.send_replace(DispatcherState::Stopped);
        self.bus.publish(Event::new(EventKind::AllWorkFinished));
        info!("all work finished");
        self.console.print("All work finished. Exiting...");
    }
}
