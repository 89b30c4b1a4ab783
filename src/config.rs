//! # Global shell configuration.
//!
//! Provides [`Config`] centralized settings for the dispatcher, the default
//! collaborators and telemetry.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → host available parallelism
//! - `progress_tick = 0s` → no progress indicator while hashing
//! - `hash_delay = 0s` → hashing completes immediately

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

/// Supported log output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Global configuration for the shell.
///
/// ## Field semantics
/// - `max_concurrent`: initial concurrency ceiling (`0` = host parallelism)
/// - `command_queue`: buffered lines between reader and dispatcher (min 1)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `hash_delay`: simulated cost of computing an order hash on `accept`
/// - `progress_tick`: period of the "working" indicator (`0s` = off)
/// - `return_window`: how long after issue a client may return an order
/// - `log_filter`: `EnvFilter` directive used when `RUST_LOG` is unset
/// - `log_format`: compact or JSON log lines
#[derive(Clone, Debug)]
pub struct Config {
    /// Initial number of commands allowed to execute at once.
    ///
    /// Operators change it at runtime with `set_mg -n=<k>`.
    pub max_concurrent: usize,

    /// Capacity of the channel carrying raw lines to the dispatcher.
    pub command_queue: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Time spent "computing" the order hash during `accept`.
    pub hash_delay: Duration,

    /// Tick period of the progress indicator shown during slow work.
    pub progress_tick: Duration,

    /// Period after issue during which a return is accepted.
    pub return_window: Duration,

    /// Default log filter directive.
    pub log_filter: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Config {
    /// Returns the initial concurrency ceiling, resolving the `0` sentinel.
    ///
    /// Always `>= 1`.
    pub fn initial_ceiling(&self) -> usize {
        match self.max_concurrent {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }

    /// Returns the progress tick as an `Option`.
    ///
    /// - `None` → indicator disabled
    /// - `Some(d)` → tick every `d`
    #[inline]
    pub fn progress_tick(&self) -> Option<Duration> {
        if self.progress_tick == Duration::ZERO {
            None
        } else {
            Some(self.progress_tick)
        }
    }

    /// Returns a command queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_queue_clamped(&self) -> usize {
        self.command_queue.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_concurrent = 0` (host parallelism)
    /// - `command_queue = 64`
    /// - `bus_capacity = 1024`
    /// - `hash_delay = 3s`
    /// - `progress_tick = 1s`
    /// - `return_window = 48h`
    /// - `log_filter = "info"`, `log_format = compact`
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            command_queue: 64,
            bus_capacity: 1024,
            hash_delay: Duration::from_secs(3),
            progress_tick: Duration::from_secs(1),
            return_window: Duration::from_secs(48 * 60 * 60),
            log_filter: "info".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ceiling_resolves_to_parallelism() {
        let cfg = Config::default();
        assert!(cfg.initial_ceiling() >= 1);

        let cfg = Config {
            max_concurrent: 3,
            ..Config::default()
        };
        assert_eq!(cfg.initial_ceiling(), 3);
    }

    #[test]
    fn test_sentinels() {
        let cfg = Config {
            progress_tick: Duration::ZERO,
            command_queue: 0,
            bus_capacity: 0,
            ..Config::default()
        };
        assert!(cfg.progress_tick().is_none());
        assert_eq!(cfg.command_queue_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
