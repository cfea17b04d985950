//! Non-fatal findings collected while building shapes.
//!
//! A diagnostic never stops synthesis: the affected fragment downgrades to
//! [`Shape::Unknown`](crate::Shape::Unknown) (or is skipped) and its siblings
//! keep going. Every record is also logged at `warn` level.

use std::fmt;

use serde::Serialize;

/// Category of a recoverable anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// A schema position held something other than a schema object.
    InvalidSchema,
    /// A `$ref` pointed outside the document or at nothing.
    UnresolvedReference,
    /// An `allOf` member did not resolve to an object shape.
    AllOfNonObject,
    /// An `enum`/`const` was empty or carried non-scalar values.
    InvalidEnum,
    /// A field name appeared twice; the first occurrence was kept.
    DuplicateField,
    /// Only unsupported composition keywords were present.
    UnsupportedKeyword,
}

/// One recoverable anomaly and where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Dotted naming path of the affected fragment (`User.address.city`).
    pub path: String,
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Human readable reason.
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Per-call collector; owned by the call, never shared.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Record and log a diagnostic.
    pub fn record(
        &mut self,
        path: impl fmt::Display,
        kind: DiagnosticKind,
        reason: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            path: path.to_string(),
            kind,
            reason: reason.into(),
        };
        tracing::warn!(path = %diagnostic.path, kind = ?kind, "{}", diagnostic.reason);
        self.records.push(diagnostic);
    }

    /// Recorded diagnostics, in the order they occurred.
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Consume the collector.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}
