//! # Command source: raw lines from an input stream.
//!
//! Lines are read on a dedicated OS thread (blocking reads on an interactive
//! stdin must never park a runtime worker or hold up runtime shutdown) and
//! forwarded in order over a bounded channel.
//!
//! ```text
//! [reader thread] ── read_line ──► mpsc::Sender<String> ──► Dispatcher
//!        │
//!        ├─ invalid UTF-8    → lossy decode, line still forwarded
//!        ├─ EOF / read error → drop sender → channel closes (same as `exit`)
//!        └─ receiver dropped → stop reading
//! ```

use std::borrow::Cow;
use std::io::{self, BufRead, BufReader};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Spawns a reader thread over `reader` and returns the line channel.
pub fn spawn_line_reader<R>(reader: R, capacity: usize) -> io::Result<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    thread::Builder::new()
        .name("command-source".to_string())
        .spawn(move || {
            let mut reader = reader;
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = decode_line(&buf);
                        if tx.blocking_send(line).is_err() {
                            debug!("dispatcher stopped reading; command source exits");
                            return;
                        }
                    }
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                    Err(error) => {
                        warn!(%error, "failed to read command line; closing input");
                        return;
                    }
                }
            }
            debug!("end of input");
        })?;
    Ok(rx)
}

/// Strips the line terminator; invalid UTF-8 becomes U+FFFD.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = line {
        warn!("command line is not valid UTF-8; undecodable bytes replaced");
    }
    line.into_owned()
}

/// Line channel over the process stdin.
pub fn stdin_lines(capacity: usize) -> io::Result<mpsc::Receiver<String>> {
    spawn_line_reader(BufReader::new(io::stdin()), capacity)
}
