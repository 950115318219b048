//! Declaration errors and the per-pass error accumulator.
//!
//! Nothing in the engine aborts a pass: every problem becomes a [`DslError`]
//! appended to the session's [`ErrorAccumulator`], and the driver inspects the
//! accumulated list once the pass has returned.

use serde::Serialize;
use std::fmt;
use std::panic::Location;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

/// Source position of the declaration call that produced an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

impl Provenance {
    /// Location of the caller of the outermost `#[track_caller]` frame.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Provenance {
            file: loc.file().to_owned(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Declaration attempted with no open container.
    Context,
    /// Argument combination that cannot be resolved to one declaration.
    Signature,
    /// Redeclaration or nesting that contradicts an explicit type.
    Conflict,
    /// A validation's own arguments are malformed.
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Context => "context",
            ErrorKind::Signature => "signature",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Validation => "validation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal declaration error.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{}{kind} error: {message}", location_prefix(.location))]
pub struct DslError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Provenance>,
}

impl DslError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        DslError {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn context(message: impl Into<String>) -> Self {
        DslError::new(ErrorKind::Context, message)
    }

    pub fn signature(message: impl Into<String>) -> Self {
        DslError::new(ErrorKind::Signature, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DslError::new(ErrorKind::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DslError::new(ErrorKind::Validation, message)
    }

    pub fn at(mut self, location: Provenance) -> Self {
        self.location = Some(location);
        self
    }

    /// Serialize for error reports. Every field is present; a missing
    /// location is null.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn location_prefix(location: &Option<Provenance>) -> String {
    location
        .as_ref()
        .map(|loc| format!("{}: ", loc))
        .unwrap_or_default()
}

/// Every error recorded by a failed pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} declaration error(s):\n{}", .0.len(), render(.0))]
pub struct DslErrors(pub Vec<DslError>);

impl DslErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DslError> {
        self.0.iter()
    }
}

fn render(errors: &[DslError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

// ──────────────────────────────────────────────
// Accumulator
// ──────────────────────────────────────────────

/// Append-only error list for one evaluation pass.
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    errors: Vec<DslError>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: DslError) {
        tracing::debug!(
            kind = error.kind.as_str(),
            message = %error.message,
            "recorded declaration error"
        );
        self.errors.push(error);
    }

    pub fn all(&self) -> &[DslError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Clear the list. Called once at the start of each top-level pass.
    pub fn reset_pass(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Provenance {
        Provenance {
            file: "schema.rs".to_string(),
            line: 12,
        }
    }

    #[test]
    fn accumulator_appends_in_order_and_resets() {
        let mut acc = ErrorAccumulator::new();
        acc.record(DslError::context("first"));
        acc.record(DslError::validation("second"));
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.all()[0].message, "first");
        assert_eq!(acc.all()[1].kind, ErrorKind::Validation);

        acc.reset_pass();
        assert!(acc.is_empty());
    }

    #[test]
    fn display_includes_location_when_present() {
        let err = DslError::conflict("incompatible redeclaration of attribute id").at(loc());
        assert_eq!(
            err.to_string(),
            "schema.rs:12: conflict error: incompatible redeclaration of attribute id"
        );
        let bare = DslError::signature("attribute name must not be empty");
        assert_eq!(
            bare.to_string(),
            "signature error: attribute name must not be empty"
        );
    }

    #[test]
    fn json_value_has_all_fields() {
        let v = DslError::context("outside").to_json_value();
        assert_eq!(
            v,
            serde_json::json!({"kind": "context", "message": "outside", "location": null})
        );

        let v = DslError::conflict("clash").at(loc()).to_json_value();
        assert_eq!(v["kind"], "conflict");
        assert_eq!(v["location"]["file"], "schema.rs");
        assert_eq!(v["location"]["line"], 12);
    }

    #[test]
    fn errors_display_lists_each_entry() {
        let errors = DslErrors(vec![
            DslError::context("a").at(loc()),
            DslError::validation("b"),
        ]);
        let text = errors.to_string();
        assert!(text.starts_with("2 declaration error(s):"));
        assert!(text.contains("  schema.rs:12: context error: a"));
        assert!(text.contains("  validation error: b"));
    }

    #[test]
    fn caller_captures_this_file() {
        let here = Provenance::caller();
        assert!(here.file.ends_with("error.rs"));
        assert!(here.line > 0);
    }
}
