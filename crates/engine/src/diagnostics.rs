use core::fmt;

use crate::model::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// BEGIN/END mismatch or an event that is illegal in the current state.
    Structural,
    /// Unexpected or missing child, illegal text, content in a nilled element.
    ContentModel,
    /// Unknown, duplicate, missing or fixed-mismatched attribute.
    Attribute,
    /// Unresolvable `xsi:type` or QName prefix.
    TypeResolution,
    /// Lexical value outside the type's lexical space.
    Conversion,
    /// Non-fatal oddities that do not affect validity.
    Compatibility,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::Compatibility => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::ContentModel => "content-model",
            Self::Attribute => "attribute",
            Self::TypeResolution => "type-resolution",
            Self::Conversion => "conversion",
            Self::Compatibility => "compatibility",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {level}[{}]: {}", self.location, self.kind.as_str(), self.message)
    }
}

/// Append-only collector with an optional cap.
///
/// Once the cap is reached further diagnostics are counted but not stored.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
    limit: Option<usize>,
    dropped: usize,
    errors: usize,
}

impl DiagnosticSink {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.limit.is_some_and(|max| self.entries.len() >= max) {
            self.dropped += 1;
            return;
        }
        if diagnostic.is_error() {
            self.errors += 1;
        }
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn limit_reached(&self) -> bool {
        self.dropped > 0
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.dropped == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dropped = 0;
        self.errors = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_counts_dropped() {
        let mut sink = DiagnosticSink::new(Some(2));
        for i in 0..5 {
            sink.push(Diagnostic::new(
                DiagnosticKind::ContentModel,
                format!("#{i}"),
                Location::new(1, i),
            ));
        }
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.dropped(), 3);
        assert!(sink.limit_reached());
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn warnings_are_not_errors() {
        let mut sink = DiagnosticSink::default();
        sink.push(Diagnostic::new(DiagnosticKind::Compatibility, "odd", Location::default()));
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.entries()[0].to_string(), "0:0: warning[compatibility]: odd");
    }
}
