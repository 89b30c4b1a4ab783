//! # Command executor: one admitted command, start to finish.
//!
//! ```text
//! Executor::run(id, invocation)
//!   ├─► admission.acquire()                (sole suspension point besides collaborators)
//!   ├─► publish CommandStarted
//!   ├─► catch_unwind(execute(invocation))
//!   │       ├─ Operation::from_name → None  → UnknownCommand
//!   │       └─ Some(op) → Flags::parse → validation → order service
//!   ├─► drop(permit)                       (every path, panics included)
//!   └─► log + publish CommandSucceeded / CommandFailed / UnknownCommand / CommandPanicked
//! ```
//!
//! ## Rules
//! - Errors never leave `run`: they are logged and published, nothing else.
//! - A panicking command is contained; its permit is still released.
//! - Leaving the outstanding task set is handled by the tracker that spawned `run`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::commands::{Flags, Invocation, Operation, help_table};
use crate::console::Console;
use crate::error::ShellError;
use crate::events::{Bus, Event, EventKind};
use crate::service::{AcceptRequest, OrderService, ValidationService, render_orders};

use super::admission::Admission;

/// Runs admitted commands against the collaborators.
pub struct Executor {
    admission: Arc<Admission>,
    orders: Arc<dyn OrderService>,
    validation: Arc<dyn ValidationService>,
    console: Console,
    bus: Bus,
}

impl Executor {
    pub fn new(
        admission: Arc<Admission>,
        orders: Arc<dyn OrderService>,
        validation: Arc<dyn ValidationService>,
        console: Console,
        bus: Bus,
    ) -> Self {
        Self {
            admission,
            orders,
            validation,
            console,
            bus,
        }
    }

    /// Executes one command, swallowing and reporting any failure.
    pub async fn run(&self, id: u64, inv: Invocation) {
        let name = inv.name.as_str();
        debug!(worker = id, command = name, "waiting for permit");
        let permit = match self.admission.acquire().await {
            Ok(p) => p,
            Err(e) => {
                error!(worker = id, command = name, error = %e, "admission failed");
                self.publish(EventKind::CommandFailed, id, name, Some(e.to_string()));
                return;
            }
        };

        debug!(worker = id, command = name, pool = permit.pool_size(), "working");
        self.bus.publish(
            Event::new(EventKind::CommandStarted)
                .with_command(id, name)
                .with_ceiling(permit.pool_size()),
        );

        let outcome = AssertUnwindSafe(self.execute(&inv)).catch_unwind().await;
        drop(permit);
        debug!(worker = id, command = name, "permit released");

        match outcome {
            Ok(Ok(Some(msg))) => {
                info!(worker = id, command = name, "{msg}");
                self.publish(EventKind::CommandSucceeded, id, name, None);
            }
            Ok(Ok(None)) => self.publish(EventKind::CommandSucceeded, id, name, None),
            Ok(Err(e @ ShellError::UnknownCommand { .. })) => {
                warn!(worker = id, command = name, "unknown command");
                self.console
                    .print("Unknown command. Type 'help' for a list of commands.");
                self.publish(EventKind::UnknownCommand, id, name, Some(e.to_string()));
            }
            Ok(Err(e)) => {
                error!(worker = id, command = name, kind = e.as_label(), error = %e, "command failed");
                self.publish(EventKind::CommandFailed, id, name, Some(e.to_string()));
            }
            Err(panic) => {
                let info = panic_message(panic.as_ref());
                error!(worker = id, command = name, panic = %info, "command panicked");
                self.publish(EventKind::CommandPanicked, id, name, Some(info));
            }
        }
    }

    fn publish(&self, kind: EventKind, id: u64, name: &str, reason: Option<String>) {
        let ev = Event::new(kind).with_command(id, name);
        self.bus.publish(match reason {
            Some(r) => ev.with_reason(r),
            None => ev,
        });
    }

    /// Dispatches by command name. `Ok(Some(msg))` is a success line to log.
    async fn execute(&self, inv: &Invocation) -> Result<Option<String>, ShellError> {
        let Some(op) = Operation::from_name(&inv.name) else {
            return Err(ShellError::UnknownCommand {
                name: inv.name.clone(),
            });
        };
        let flags = Flags::parse(&inv.name, op.flags(), &inv.args)?;

        match op {
            Operation::Help => {
                self.console.print(&help_table());
                Ok(None)
            }
            Operation::Accept => {
                let req = AcceptRequest {
                    id: flags.get("id").to_string(),
                    user_id: flags.get("u_id").to_string(),
                    date: flags.get("date").to_string(),
                    price: flags.get("price").to_string(),
                    weight: flags.get("w").to_string(),
                    package: flags.get("p").to_string(),
                };
                let order = self.validation.validate_accept(&req).await?;
                let order = self.orders.accept(order).await?;
                Ok(Some(format!("Order {} accepted.", order.id)))
            }
            Operation::Issue => {
                let ids: Vec<String> = flags
                    .get("ids")
                    .split(',')
                    .map(str::to_string)
                    .collect();
                let orders = self.validation.validate_issue(&ids).await?;
                let n = self.orders.issue(orders).await?;
                Ok(Some(format!("{n} order(s) issued.")))
            }
            Operation::AcceptReturn => {
                let order = self
                    .validation
                    .validate_accept_return(flags.get_or("id", "0"), flags.get_or("u_id", "0"))
                    .await?;
                self.orders.accept_return(order).await?;
                Ok(Some("Return accepted.".to_string()))
            }
            Operation::ReturnToCourier => {
                let id = flags.get_or("id", "0");
                self.validation.validate_return_to_courier(id).await?;
                self.orders.return_to_courier(id).await?;
                Ok(Some(format!("Order {id} returned to courier.")))
            }
            Operation::ListReturns => {
                let page = self
                    .validation
                    .validate_list(flags.get_or("ofs", "0"), flags.get_or("lmt", "0"))?;
                let orders = self.orders.list_returns(page).await?;
                self.console.print(&render_orders(&orders));
                Ok(None)
            }
            Operation::ListOrders => {
                let page = self
                    .validation
                    .validate_list(flags.get_or("ofs", "0"), flags.get_or("lmt", "0"))?;
                let orders = self
                    .orders
                    .list_orders(flags.get_or("u_id", "0"), page)
                    .await?;
                self.console.print(&render_orders(&orders));
                Ok(None)
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
