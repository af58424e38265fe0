use parking_lot::Mutex;

/// Destination for user-facing console text.
pub trait ConsoleSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Forwards console text to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ConsoleSink for LogSink {
    fn write_line(&self, line: &str) {
        log::info!("{line}");
    }
}

/// Prints console text to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Collects console text so hosts and tests can inspect it later.
#[derive(Debug, Default)]
pub struct BufferedSink {
    lines: Mutex<Vec<String>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Removes and returns the buffered lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl ConsoleSink for BufferedSink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_sink_collects_and_drains() {
        let sink = BufferedSink::new();
        sink.write_line("one");
        sink.write_line("two");
        assert_eq!(sink.lines(), vec!["one", "two"]);
        assert_eq!(sink.take(), vec!["one", "two"]);
        assert!(sink.lines().is_empty());
    }
}
