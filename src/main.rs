use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use pickpoint::{
    Config, Dispatcher, LogFormat, MemoryStorage, OrderManager, Storage, Validator,
    spawn_signal_monitor, stdin_lines, telemetry,
};

#[derive(Parser, Debug)]
#[command(name = "pickpoint", version, about = "Pick-up point operator shell")]
struct Cli {
    /// Commands allowed to execute at once (0 = number of CPUs).
    #[arg(short = 'n', long, default_value_t = 0)]
    max_concurrent: usize,

    /// Log filter directive; `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    log_filter: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Simulated hashing time for `accept`, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    hash_delay_ms: u64,

    /// Progress indicator period in milliseconds (0 disables it).
    #[arg(long, default_value_t = 1000)]
    progress_tick_ms: u64,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            max_concurrent: self.max_concurrent,
            hash_delay: Duration::from_millis(self.hash_delay_ms),
            progress_tick: Duration::from_millis(self.progress_tick_ms),
            log_filter: self.log_filter,
            log_format: self.log_format,
            ..Config::default()
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = Cli::parse().into_config();
    telemetry::initialise(&cfg).context("initialising telemetry")?;

    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let dispatcher = Dispatcher::builder(cfg.clone()).build(
        Arc::new(OrderManager::new(Arc::clone(&storage), &cfg)),
        Arc::new(Validator::new(storage, &cfg)),
    );

    if let Err(error) = spawn_signal_monitor(dispatcher.shutdown_token()) {
        error!(%error, "failed to install signal handlers; stop with 'exit'");
    }
    let lines = stdin_lines(cfg.command_queue_clamped()).context("starting command source")?;

    println!("Welcome to the pick-up point. Type 'help' for a list of commands.");
    let summary = dispatcher.run(lines).await;
    info!(
        admitted = summary.admitted,
        ceiling = summary.ceiling,
        reason = summary.reason,
        "shell stopped"
    );
    println!("Bye!");
    Ok(())
}
