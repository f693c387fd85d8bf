//! Status log sinks.
//!
//! The status log is the human-readable record of the run ("Lane 0 GREEN for
//! 10 seconds", ...). It is separate from `log` diagnostics, which go through
//! env_logger. Callers write lines while still holding the shared-state lock,
//! so line order matches the order in which the facts happened.

use crate::error::SimulationError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Append-only sink for status lines.
pub trait LogSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Writes each line to a file (flushed immediately) and optionally to stdout.
pub struct TrafficLog {
    file: Mutex<BufWriter<File>>,
    echo_stdout: bool,
}

impl TrafficLog {
    /// Creates (or truncates) the log file at `path`.
    pub fn create(path: impl AsRef<Path>, echo_stdout: bool) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SimulationError::LogSink {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            echo_stdout,
        })
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{}", line)?;
        file.flush()?;
        if self.echo_stdout {
            println!("{}", line);
        }
        Ok(())
    }
}

impl LogSink for TrafficLog {
    fn line(&self, line: &str) {
        if let Err(e) = self.write_line(line) {
            log::error!("Error writing status line: {}", e);
        }
    }
}

/// Keeps every line in memory. Used by tests and benches.
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
    appended: Condvar,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|l| l.contains(needle))
    }

    /// Blocks until a line containing `needle` has been written, or `timeout`
    /// passes. Returns whether the line showed up.
    pub fn wait_for_line(&self, needle: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if lines.iter().any(|l| l.contains(needle)) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            lines = self
                .appended
                .wait_timeout(lines, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl LogSink for MemoryLog {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        self.appended.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn traffic_log_writes_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traffic_log.txt");
        let log = TrafficLog::create(&path, false).unwrap();
        log.line("Traffic simulation started");
        log.line("Lane 0 GREEN for 10 seconds");

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Traffic simulation started\nLane 0 GREEN for 10 seconds\n"
        );
    }

    #[test]
    fn traffic_log_reports_unopenable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("traffic_log.txt");
        let err = TrafficLog::create(&path, false).err().unwrap();
        assert!(matches!(err, SimulationError::LogSink { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn memory_log_wakes_waiters() {
        let log = Arc::new(MemoryLog::new());
        let writer = Arc::clone(&log);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            writer.line("Emergency auto-cleared (simulated).");
        });
        assert!(log.wait_for_line("auto-cleared", Duration::from_secs(5)));
        handle.join().unwrap();
        assert!(!log.wait_for_line("never written", Duration::from_millis(10)));
    }
}
