//! Operator-facing output sink.
//!
//! Command results (help, listings, hints) are written as whole blocks under a
//! mutex so output from concurrent commands never interleaves mid-table.
//! Diagnostics go through `tracing`, not here.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

type Sink = Box<dyn Write + Send>;

/// Shared, line-atomic writer.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Sink>>,
}

impl Console {
    /// Console writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Console over any writer.
    pub fn new(w: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(w))),
        }
    }

    /// Console that records everything into memory.
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        (Self::new(captured.clone()), captured)
    }

    /// Writes `text` followed by a newline as one block.
    pub fn print(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let res = writeln!(out, "{}", text.trim_end_matches('\n')).and_then(|()| out.flush());
        if let Err(error) = res {
            warn!(%error, "failed to write to console");
        }
    }
}

/// In-memory console buffer.
#[derive(Clone, Default)]
pub struct Captured {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
