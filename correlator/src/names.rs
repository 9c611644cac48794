// names.rs — Canonical node names for cross-document correlation
//
// HLS tools decorate node names with display prefixes ("kernel: ",
// "Fused loop ", "Partially unrolled ") that are not part of the identity
// used by the ordered-block, timing and schedule documents. This module
// classifies a raw name and strips the prefix.
//
// Failure modes: none (unrecognized names pass through unchanged).
// Side effects: none.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

const FUSED_LOOP_PREFIX: &str = "Fused loop ";
const PARTIALLY_UNROLLED_PREFIX: &str = "Partially unrolled ";
const FUNCTION_SEPARATOR: &str = ": ";

// Word characters and digits are ASCII only; `(?-u)` turns off the Unicode
// classes `\w` and `\d` default to.
lazy_static! {
    static ref FUNCTION_LABEL: Regex = Regex::new(r"(?-u)\w+: \w+").unwrap();
    static ref FUSED_LOOP: Regex = Regex::new(r"(?-u)Fused loop [\w<>]+\.B\d+").unwrap();
    static ref PARTIALLY_UNROLLED: Regex =
        Regex::new(r"(?-u)Partially unrolled [\w<>]+\.B\d+").unwrap();
    static ref BASIC_BLOCK: Regex =
        Regex::new(r"(?-u)(Fused loop |Partially unrolled )?[\w<>]+\.B\d+").unwrap();
}

/// Which display prefix, if any, a raw node name carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameKind {
    /// `<word>: <word>`, e.g. `kernel: foo`.
    Function,
    /// `Fused loop <identifier>.B<digits>`.
    FusedLoop,
    /// `Partially unrolled <identifier>.B<digits>`.
    PartiallyUnrolled,
    Plain,
}

/// Classify a raw name. Checks run in priority order: the function label
/// first, then the two block-shaped prefixes. Only one class applies.
pub fn classify(raw: &str) -> NameKind {
    if FUNCTION_LABEL.is_match(raw) {
        NameKind::Function
    } else if FUSED_LOOP.is_match(raw) {
        NameKind::FusedLoop
    } else if PARTIALLY_UNROLLED.is_match(raw) {
        NameKind::PartiallyUnrolled
    } else {
        NameKind::Plain
    }
}

/// Strip the display prefix from `raw`, yielding the correlation key.
///
/// Function labels lose everything up to and including the first `": "`.
/// Fused and partially unrolled loops lose their literal prefix whenever the
/// pattern matches, whether or not the whole name is a basic block.
pub fn canonicalize(raw: &str) -> String {
    match classify(raw) {
        NameKind::Function => match raw.split_once(FUNCTION_SEPARATOR) {
            Some((_, rest)) => rest.to_string(),
            None => raw.to_string(),
        },
        NameKind::FusedLoop => raw.replacen(FUSED_LOOP_PREFIX, "", 1),
        NameKind::PartiallyUnrolled => raw.replacen(PARTIALLY_UNROLLED_PREFIX, "", 1),
        NameKind::Plain => raw.to_string(),
    }
}

/// True when `name` contains a basic-block shaped identifier (`foo.B12`),
/// optionally behind a fused/unrolled prefix. Gates timing enrichment.
pub fn is_basic_block(name: &str) -> bool {
    BASIC_BLOCK.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_function_label() {
        assert_eq!(canonicalize("kernel: L1"), "L1");
        assert_eq!(canonicalize("function: foo.B2"), "foo.B2");
        assert_eq!(canonicalize("Kernel: vector_add"), "vector_add");
    }

    #[test]
    fn function_label_strips_only_first_separator() {
        assert_eq!(canonicalize("kernel: a: b"), "a: b");
    }

    #[test]
    fn strips_fused_and_unrolled_prefixes() {
        assert_eq!(canonicalize("Fused loop foo.B2"), "foo.B2");
        assert_eq!(canonicalize("Partially unrolled bar.B3"), "bar.B3");
        assert_eq!(canonicalize("Fused loop ns<int>.B14"), "ns<int>.B14");
    }

    #[test]
    fn unrecognized_names_are_identity() {
        assert_eq!(canonicalize("plainName"), "plainName");
        assert_eq!(canonicalize("Fused loop without_block"), "Fused loop without_block");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn function_check_takes_priority() {
        assert_eq!(classify("kernel: Fused loop foo.B2"), NameKind::Function);
        assert_eq!(canonicalize("kernel: Fused loop foo.B2"), "Fused loop foo.B2");
    }

    #[test]
    fn classify_each_kind() {
        assert_eq!(classify("kernel: foo"), NameKind::Function);
        assert_eq!(classify("Fused loop foo.B2"), NameKind::FusedLoop);
        assert_eq!(classify("Partially unrolled foo.B2"), NameKind::PartiallyUnrolled);
        assert_eq!(classify("foo.B2"), NameKind::Plain);
    }

    #[test]
    fn word_classes_are_ascii() {
        assert_eq!(classify("ядро: foo"), NameKind::Plain);
        assert_eq!(canonicalize("ядро: foo"), "ядро: foo");
        assert!(!is_basic_block("блок.B1"));
        assert!(!is_basic_block("foo.B١"));
        assert_eq!(canonicalize("kernel: ядро"), "kernel: ядро");
    }

    #[test]
    fn basic_block_shape() {
        assert!(is_basic_block("foo.B12"));
        assert!(is_basic_block("Fused loop foo.B2"));
        assert!(is_basic_block("Partially unrolled bar.B3"));
        assert!(is_basic_block("tmpl<float>.B0"));
        assert!(!is_basic_block("kernel: foo"));
        assert!(!is_basic_block("foo.Bx"));
        assert!(!is_basic_block("plainName"));
    }
}
