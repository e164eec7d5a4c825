use hvinstall::executor::{ConsoleLine, ConsoleSink, StreamKind};
use parking_lot::Mutex;

/// Keeps every line it receives.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().clone()
    }

    pub fn stream(&self, stream: StreamKind) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.stream == stream)
            .map(|line| line.text.clone())
            .collect()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.stream(StreamKind::Stdout)
    }

    pub fn stderr(&self) -> Vec<String> {
        self.stream(StreamKind::Stderr)
    }
}

impl ConsoleSink for RecordingSink {
    fn line(&self, stream: StreamKind, text: &str) {
        self.lines.lock().push(ConsoleLine {
            stream,
            text: text.to_string(),
        });
    }
}
