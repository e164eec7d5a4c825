//! Line readers for the install process pipes.

use std::{
    io::{BufRead, BufReader, Read},
    process::{ChildStderr, ChildStdout},
    sync::Arc,
    thread::{self, JoinHandle},
};

use hvinstall_shared::errors::{InstallerError, InstallerResult};

use super::sink::{ConsoleSink, StreamKind};

/// Owns one reader thread per pipe, each forwarding lines to the sink.
///
/// Output is not assumed to be UTF-8; invalid bytes are replaced. Threads end
/// on EOF (the child closed its side) or on the first read error.
pub(super) struct StreamReaders {
    stdout_thread: Option<JoinHandle<InstallerResult<()>>>,
    stderr_thread: Option<JoinHandle<InstallerResult<()>>>,
}

impl StreamReaders {
    pub(super) fn spawn(
        stdout: ChildStdout,
        stderr: ChildStderr,
        sink: Arc<dyn ConsoleSink>,
    ) -> InstallerResult<Self> {
        let stdout_thread = Self::spawn_reader(stdout, StreamKind::Stdout, Arc::clone(&sink))?;
        let stderr_thread = Self::spawn_reader(stderr, StreamKind::Stderr, sink)?;

        Ok(Self {
            stdout_thread: Some(stdout_thread),
            stderr_thread: Some(stderr_thread),
        })
    }

    fn spawn_reader<R: Read + Send + 'static>(
        pipe: R,
        stream: StreamKind,
        sink: Arc<dyn ConsoleSink>,
    ) -> InstallerResult<JoinHandle<InstallerResult<()>>> {
        thread::Builder::new()
            .name(format!("hvinstall-{}", stream))
            .spawn(move || {
                let mut reader = BufReader::new(pipe);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    let read = reader.read_until(b'\n', &mut buf).map_err(|e| {
                        InstallerError::ProcessStream(format!(
                            "Failed to read install {}: {}",
                            stream, e
                        ))
                    })?;
                    if read == 0 {
                        break;
                    }
                    sink.line(stream, &String::from_utf8_lossy(trim_line_ending(&buf)));
                }
                tracing::debug!(stream = %stream, "Pipe closed, reader exiting");
                Ok(())
            })
            .map_err(|e| {
                InstallerError::ProcessStream(format!(
                    "Failed to spawn {} reader thread: {}",
                    stream, e
                ))
            })
    }

    /// Wait for both readers and return the first error either hit.
    pub(super) fn join(mut self) -> InstallerResult<()> {
        let stdout = join_reader(self.stdout_thread.take(), StreamKind::Stdout);
        let stderr = join_reader(self.stderr_thread.take(), StreamKind::Stderr);
        stdout.and(stderr)
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn join_reader(
    handle: Option<JoinHandle<InstallerResult<()>>>,
    stream: StreamKind,
) -> InstallerResult<()> {
    match handle {
        Some(handle) => handle.join().unwrap_or_else(|e| {
            Err(InstallerError::ProcessStream(format!(
                "{} reader thread panicked: {:?}",
                stream, e
            )))
        }),
        None => Ok(()),
    }
}

impl Drop for StreamReaders {
    fn drop(&mut self) {
        if let Some(handle) = self.stdout_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.stderr_thread.take() {
            let _ = handle.join();
        }
    }
}
