//! Brace-balanced function body extraction.
//!
//! The scanner is a two-state machine over raw bytes: it seeks the first `{`
//! after the declaration, then tracks nesting depth until the matching `}`.
//! It has no notion of comments or string literals, so a brace inside either
//! is counted like any other.

use crate::error::{AuditError, Result};

/// Scanner state while walking the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingOpen,
    InBody { open: usize, depth: usize },
}

/// Declaration prefix searched for when locating `name`.
pub fn declaration_pattern(name: &str) -> String {
    format!("function {name}(")
}

/// Return the text strictly between the outer braces of function `name`.
///
/// The first textual occurrence of `function <name>(` wins. The returned
/// slice borrows from `source` and excludes both braces.
pub fn extract_function_body<'a>(source: &'a str, name: &str) -> Result<&'a str> {
    let start = source
        .find(&declaration_pattern(name))
        .ok_or_else(|| AuditError::FunctionNotFound {
            function: name.to_string(),
        })?;

    let bytes = source.as_bytes();
    let mut state = ScanState::SeekingOpen;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        state = match (state, b) {
            (ScanState::SeekingOpen, b'{') => ScanState::InBody { open: i, depth: 1 },
            (ScanState::SeekingOpen, _) => ScanState::SeekingOpen,
            (ScanState::InBody { open, depth }, b'{') => ScanState::InBody {
                open,
                depth: depth + 1,
            },
            (ScanState::InBody { open, depth: 1 }, b'}') => {
                log::trace!("body of `{name}` spans bytes {}..{i}", open + 1);
                // Both indices sit on ASCII braces, so they are char boundaries.
                return Ok(&source[open + 1..i]);
            }
            (ScanState::InBody { open, depth }, b'}') => ScanState::InBody {
                open,
                depth: depth - 1,
            },
            (s @ ScanState::InBody { .. }, _) => s,
        };
    }

    match state {
        ScanState::SeekingOpen => Err(AuditError::BodyStartNotFound {
            function: name.to_string(),
        }),
        ScanState::InBody { depth, .. } => Err(AuditError::UnbalancedBraces {
            function: name.to_string(),
            depth,
        }),
    }
}
