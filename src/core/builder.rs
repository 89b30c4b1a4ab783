use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{admission::Admission, dispatcher::Dispatcher, executor::Executor};
use crate::{
    config::Config,
    console::Console,
    events::Bus,
    service::{OrderService, ValidationService},
};

/// Builder for constructing a [`Dispatcher`] with optional wiring.
pub struct DispatcherBuilder {
    cfg: Config,
    console: Option<Console>,
    shutdown: Option<CancellationToken>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            console: None,
            shutdown: None,
        }
    }

    /// Sets the operator console. Defaults to stdout.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = Some(console);
        self
    }

    /// Shares an existing shutdown flag instead of creating a fresh one.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Builds the dispatcher around the given collaborators.
    ///
    /// Initializes:
    /// - the admission controller at [`Config::initial_ceiling`]
    /// - the event bus
    /// - the executor shared by every spawned command
    pub fn build(
        self,
        orders: Arc<dyn OrderService>,
        validation: Arc<dyn ValidationService>,
    ) -> Dispatcher {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let console = self.console.unwrap_or_else(Console::stdout);
        let shutdown = self.shutdown.unwrap_or_default();
        let admission = Arc::new(Admission::new(self.cfg.initial_ceiling()));

        let executor = Arc::new(Executor::new(
            Arc::clone(&admission),
            orders,
            validation,
            console.clone(),
            bus.clone(),
        ));
        Dispatcher::new_internal(admission, executor, shutdown, bus, console)
    }
}

impl Dispatcher {
    /// Starts a [`DispatcherBuilder`].
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }
}
