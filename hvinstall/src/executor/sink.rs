//! Destinations for install process output.

use std::fmt;

use tokio::sync::mpsc;

/// Which pipe of the install process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives output lines from both reader threads.
///
/// Lines of one stream arrive in order; lines of different streams may
/// interleave arbitrarily. Implementations must accept calls from two threads
/// at once.
pub trait ConsoleSink: Send + Sync {
    fn line(&self, stream: StreamKind, text: &str);
}

/// Logs each line under `install:stdout` (debug) or `install:stderr` (warn).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn line(&self, stream: StreamKind, text: &str) {
        match stream {
            StreamKind::Stdout => tracing::debug!(target: "install:stdout", "{}", text),
            StreamKind::Stderr => tracing::warn!(target: "install:stderr", "{}", text),
        }
    }
}

/// A line as delivered through a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub stream: StreamKind,
    pub text: String,
}

/// Forwards lines to a single consumer over an unbounded channel.
///
/// The consumer is the only writer to whatever it renders into, so the two
/// reader threads never touch the display directly.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ConsoleLine>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConsoleLine>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ConsoleSink for ChannelSink {
    fn line(&self, stream: StreamKind, text: &str) {
        let line = ConsoleLine {
            stream,
            text: text.to_string(),
        };
        if self.tx.send(line).is_err() {
            tracing::trace!(stream = %stream, "Console receiver dropped, discarding line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_preserves_per_stream_order() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.line(StreamKind::Stdout, "one");
        sink.line(StreamKind::Stderr, "oops");
        sink.line(StreamKind::Stdout, "two");
        drop(sink);

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Ok(line) = rx.try_recv() {
            match line.stream {
                StreamKind::Stdout => stdout.push(line.text),
                StreamKind::Stderr => stderr.push(line.text),
            }
        }
        assert_eq!(stdout, vec!["one", "two"]);
        assert_eq!(stderr, vec!["oops"]);
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);
        sink.line(StreamKind::Stdout, "ignored");
    }
}
