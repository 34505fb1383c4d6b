//! Diagnostics side channel between the rewrite engine and its callers.
//!
//! The engine never aborts the pass for per-type conditions; it reports them
//! here and keeps going. The batch driver drains the sink after each unit and
//! renders the events for the user.

use serde::Serialize;

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Routine progress information.
    Info,
    /// A recoverable condition that changed the outcome for one type.
    Warning,
    /// A condition that prevented part of the rewrite.
    Error,
}

/// A single diagnostic event with the type/file it concerns.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Event severity.
    pub severity: Severity,
    /// Type or file name the event refers to.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

/// Collects diagnostics emitted during a rewrite pass.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    events: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an info event.
    pub fn info(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Info, subject, message);
    }

    /// Record a warning event.
    pub fn warning(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, subject, message);
    }

    /// Record an error event.
    pub fn error(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, subject, message);
    }

    fn push(&mut self, severity: Severity, subject: impl Into<String>, message: impl Into<String>) {
        self.events.push(Diagnostic {
            severity,
            subject: subject.into(),
            message: message.into(),
        });
    }

    /// All recorded events in emission order.
    #[must_use]
    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Number of events at the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.events
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Remove and return all recorded events.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_records_in_order() {
        let mut sink = DiagnosticSink::new();
        sink.info("A", "first");
        sink.error("B", "second");
        sink.warning("C", "third");

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.count(Severity::Error), 1);
        assert_eq!(sink.events()[0].subject, "A");

        let drained = sink.drain();
        assert_eq!(drained.len(), 3);
        assert!(sink.events().is_empty());
    }
}
