//! The debug channel.
//!
//! The client reports non-fatal diagnostics (installed integrations, the
//! empty-DSN notice, pipeline drop reasons, transport failures) through a
//! [`DebugSink`] chosen at construction time.  Without debug mode the
//! channel discards everything.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Sink that receives diagnostic messages from a client.
///
/// The default sink writes to stderr; [`WriterSink`] adapts any
/// [`std::io::Write`] implementation.
pub trait DebugSink: Send + Sync {
    /// Writes one diagnostic line.
    fn write_line(&self, message: fmt::Arguments<'_>);
}

/// Sink that writes diagnostics to stderr.
///
/// This is what a client in debug mode uses when no other sink is
/// configured.
#[derive(Debug, Default)]
pub struct StderrSink;

impl DebugSink for StderrSink {
    fn write_line(&self, message: fmt::Arguments<'_>) {
        eprintln!("[faultline] {}", message);
    }
}

/// Sink that writes diagnostics to an arbitrary writer.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Creates a sink that writes one line per diagnostic to `writer`.
    pub fn new(writer: W) -> WriterSink<W> {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> DebugSink for WriterSink<W> {
    fn write_line(&self, message: fmt::Arguments<'_>) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // diagnostics must never fail the instrumented application
        let _ = writeln!(writer, "[faultline] {}", message);
    }
}

/// The per-client debug logger.
///
/// Holds either a sink or nothing; logging to a disabled logger is a no-op.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    sink: Option<Arc<dyn DebugSink>>,
}

impl DebugLogger {
    pub fn disabled() -> DebugLogger {
        DebugLogger { sink: None }
    }

    pub fn new(sink: Arc<dyn DebugSink>) -> DebugLogger {
        DebugLogger { sink: Some(sink) }
    }

    pub fn log(&self, message: fmt::Arguments<'_>) {
        if let Some(ref sink) = self.sink {
            sink.write_line(message);
        }
    }
}

impl fmt::Debug for DebugLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLogger")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}
