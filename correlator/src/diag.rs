// diag.rs — Correlation diagnostics
//
// The correlator never fails on incomplete input; it substitutes sentinels
// and drops fictitious nodes. Those decisions are recorded here so callers
// can see why a row is missing or a cell reads "Unknown".
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `W0101`, `N0301`).
///
/// Once assigned, a code must never be reassigned to a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub mod codes {
    use super::DiagCode;

    /// Two ordered-block entries share a canonical name; the later wins.
    pub const DUPLICATE_BLOCK_NAME: DiagCode = DiagCode("W0101");
    /// An indexed block was never placed by the hierarchy walk.
    pub const UNPLACED_BLOCK: DiagCode = DiagCode("N0201");
    /// A hierarchy node is not in the index; its subtree is not propagated.
    pub const UNINDEXED_NODE: DiagCode = DiagCode("N0202");
    /// A fictitious node (and its subtree) was left out of the table.
    pub const FICTITIOUS_NODE: DiagCode = DiagCode("N0301");
    /// A timed basic block has no entry in the schedule document.
    pub const UNKNOWN_LATENCY: DiagCode = DiagCode("N0302");
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagLevel {
    Note,
    Warning,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub level: DiagLevel,
    /// The node or block name the diagnostic is about.
    pub subject: String,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(
        code: DiagCode,
        level: DiagLevel,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            level,
            subject: subject.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn warning(code: DiagCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, DiagLevel::Warning, subject, message)
    }

    pub fn note(code: DiagCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, DiagLevel::Note, subject, message)
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Warning => "warning",
            DiagLevel::Note => "note",
        };
        write!(
            f,
            "{}[{}]: `{}`: {}",
            level, self.code, self.subject, self.message
        )?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_note() {
        let d = Diagnostic::note(codes::FICTITIOUS_NODE, "foo.B9", "not in block index");
        assert_eq!(format!("{d}"), "note[N0301]: `foo.B9`: not in block index");
    }

    #[test]
    fn display_warning_with_hint() {
        let d = Diagnostic::warning(codes::DUPLICATE_BLOCK_NAME, "foo.B1", "listed twice")
            .with_hint("block names must be unique across functions");
        assert_eq!(
            format!("{d}"),
            "warning[W0101]: `foo.B1`: listed twice\n  hint: block names must be unique across functions"
        );
    }

    #[test]
    fn warnings_outrank_notes() {
        assert!(DiagLevel::Warning > DiagLevel::Note);
    }
}
