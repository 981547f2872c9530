//! Simulation log writer.
//!
//! Lines look like `0.050000 - Process 1: end processing action`: seconds and
//! microseconds since the run started. Every sink gets the same bytes.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

pub struct SimLog {
    start: Instant,
    last: Instant,
    sinks: Vec<Box<dyn Write + Send>>,
    lines: usize,
}

impl SimLog {
    pub fn new(start: Instant, sinks: Vec<Box<dyn Write + Send>>) -> Self {
        Self {
            start,
            last: start,
            sinks,
            lines: 0,
        }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Formats `message` stamped at `at`. Stamps never go backwards.
    pub fn format_line(&mut self, at: Instant, message: &str) -> String {
        self.last = self.last.max(at);
        let elapsed = self.last.saturating_duration_since(self.start);
        format!(
            "{}.{:06} - {}\n",
            elapsed.as_secs(),
            elapsed.subsec_micros(),
            message
        )
    }

    pub fn write_at(&mut self, at: Instant, message: &str) -> io::Result<()> {
        let line = self.format_line(at, message);
        for sink in &mut self.sinks {
            sink.write_all(line.as_bytes())?;
        }
        self.lines += 1;
        Ok(())
    }

    pub fn write(&mut self, message: &str) -> io::Result<()> {
        self.write_at(Instant::now(), message)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sinks.iter_mut().try_for_each(|sink| sink.flush())
    }
}

/// In-memory sink whose clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn formats_seconds_and_microseconds() {
        let start = Instant::now();
        let mut log = SimLog::new(start, Vec::new());
        assert_eq!(
            log.format_line(start + Duration::from_millis(50), "Process 1: end processing action"),
            "0.050000 - Process 1: end processing action\n"
        );
        assert_eq!(
            log.format_line(start + Duration::from_micros(12_345_678), "x"),
            "12.345678 - x\n"
        );
    }

    #[test]
    fn stamps_are_monotonic() {
        let start = Instant::now();
        let mut log = SimLog::new(start, Vec::new());
        log.format_line(start + Duration::from_millis(30), "later");
        assert_eq!(
            log.format_line(start + Duration::from_millis(10), "earlier"),
            "0.030000 - earlier\n"
        );
    }

    #[test]
    fn every_sink_gets_identical_bytes() {
        let (a, b) = (MemorySink::new(), MemorySink::new());
        let start = Instant::now();
        let mut log = SimLog::new(start, vec![Box::new(a.clone()), Box::new(b.clone())]);
        log.write_at(start, "Simulator program starting").unwrap();
        log.write_at(start + Duration::from_millis(1), "Simulator program ending").unwrap();
        log.flush().unwrap();
        assert_eq!(a.contents(), b.contents());
        assert_eq!(log.lines(), 2);
        assert!(a.contents().ends_with("0.001000 - Simulator program ending\n"));
    }
}
