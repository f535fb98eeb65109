//! Per-component logger handles with an optional caller-supplied sink.

use crate::config::is_enabled;
use crate::level::Level;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied destination for operational log lines.
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// A cloneable logging handle.
///
/// Without a sink, lines are written through the global writer under
/// `target`. With a sink, lines that pass the global level filter are handed
/// to the sink instead, which lets an embedding application route session
/// events wherever it keeps its own logs.
///
/// ```
/// use porter_log::Logger;
/// use std::sync::{Arc, Mutex};
///
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let captured = lines.clone();
/// let logger = Logger::new("porter::example")
///     .with_sink(move |line| captured.lock().unwrap().push(line.to_string()));
///
/// logger.warn("session not found");
/// assert_eq!(lines.lock().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct Logger {
    target: &'static str,
    sink: Option<Sink>,
}

impl Logger {
    /// Logger writing to the global writer under `target`.
    pub const fn new(target: &'static str) -> Self {
        Self { target, sink: None }
    }

    /// Route lines to `sink` instead of stderr.
    pub fn with_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Route lines to an already shared sink.
    pub fn with_shared_sink(mut self, sink: Sink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Target used for the global writer.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Whether a custom sink is installed.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Emit `message` at `level`.
    pub fn log(&self, level: Level, message: &str) {
        if !is_enabled(level) {
            return;
        }

        match &self.sink {
            Some(sink) => sink(message),
            None => crate::output::emit(level, self.target, message),
        }
    }

    pub fn trace(&self, message: &str) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("porter")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .field("sink", &self.sink.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
