//! `return <digits>;` literal collection.
//!
//! Matches the keyword `return`, at least one whitespace character, a run of
//! ASCII decimal digits, and a `;` directly after the digits. Matches are
//! non-overlapping and reported in textual order; anything else is skipped.
//!
//! Whitespace is the Unicode set (`char::is_whitespace`) plus the ASCII
//! separators U+001C..U+001F, so vertical tab and form feed count too.

use crate::error::{AuditError, Result};

const KEYWORD: &str = "return";

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Iterator over the digit run of every `return N;` statement in a body.
pub struct ReturnLiterals<'a> {
    body: &'a str,
    pos: usize,
}

impl<'a> ReturnLiterals<'a> {
    pub fn new(body: &'a str) -> Self {
        Self { body, pos: 0 }
    }

    /// Try to match the rest of the statement after a keyword at `at`.
    /// Returns the digit slice and the index just past the `;`.
    fn match_at(&self, at: usize) -> Option<(&'a str, usize)> {
        let ws_start = at + KEYWORD.len();
        let rest = &self.body[ws_start..];
        let ws_len = rest
            .char_indices()
            .find(|&(_, c)| !is_separator(c))
            .map_or(rest.len(), |(i, _)| i);
        if ws_len == 0 {
            return None;
        }

        let bytes = self.body.as_bytes();
        let digits_start = ws_start + ws_len;
        let mut i = digits_start;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start || bytes.get(i) != Some(&b';') {
            return None;
        }

        Some((&self.body[digits_start..i], i + 1))
    }
}

impl<'a> Iterator for ReturnLiterals<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.body.len() {
            let at = self.pos + self.body[self.pos..].find(KEYWORD)?;
            match self.match_at(at) {
                Some((digits, end)) => {
                    self.pos = end;
                    return Some(digits);
                }
                // `return` is ASCII, so stepping one byte stays on a boundary.
                None => self.pos = at + 1,
            }
        }
        None
    }
}

/// Collect every `return N;` literal of `function`'s body in textual order.
///
/// Length is not checked here; callers compare against the table size.
pub fn collect_returns(body: &str, function: &str) -> Result<Vec<u64>> {
    ReturnLiterals::new(body)
        .map(|digits| {
            digits
                .parse::<u64>()
                .map_err(|_| AuditError::LiteralOverflow {
                    function: function.to_string(),
                    literal: digits.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let body = "if (i == 0) return 0; // comment\n if (i == 1) return 1;\n/* x */ return 2;";
        assert_eq!(collect_returns(body, "t").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_ignores_non_literal_returns() {
        let body = "return x; return 5 ; return; return(3); return 7;";
        assert_eq!(collect_returns(body, "t").unwrap(), vec![7]);
    }

    #[test]
    fn test_requires_whitespace_after_keyword() {
        assert_eq!(collect_returns("return4; return\t\n 4;", "t").unwrap(), vec![4]);
    }

    #[test]
    fn test_vertical_tab_and_form_feed_are_whitespace() {
        assert_eq!(collect_returns("return\x0b5;", "t").unwrap(), vec![5]);
        assert_eq!(collect_returns("return\x0c6; return\x1f7;", "t").unwrap(), vec![6, 7]);
    }

    #[test]
    fn test_unicode_whitespace_after_keyword() {
        assert_eq!(collect_returns("return\u{a0}8; return\u{2028}9;", "t").unwrap(), vec![8, 9]);
        // Non-ASCII digits are not literals.
        assert!(collect_returns("return \u{663};", "t").unwrap().is_empty());
    }

    #[test]
    fn test_keyword_inside_identifier_still_matches() {
        // No word boundary: `myreturn 9;` contains `return 9;`.
        assert_eq!(collect_returns("myreturn 9;", "t").unwrap(), vec![9]);
    }

    #[test]
    fn test_large_literal() {
        let body = "return 16777215; return 18446744073709551615;";
        assert_eq!(
            collect_returns(body, "t").unwrap(),
            vec![16_777_215, u64::MAX]
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = collect_returns("return 18446744073709551616;", "ptable").unwrap_err();
        assert!(matches!(
            err,
            AuditError::LiteralOverflow { ref function, ref literal }
                if function == "ptable" && literal == "18446744073709551616"
        ));
    }

    #[test]
    fn test_empty_body() {
        assert!(collect_returns("", "t").unwrap().is_empty());
        assert!(collect_returns("return", "t").unwrap().is_empty());
    }

    #[test]
    fn test_iterator_yields_digit_runs() {
        let found: Vec<_> = ReturnLiterals::new("  return 1; return 22;").collect();
        assert_eq!(found, vec!["1", "22"]);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(collect_returns("return 007;", "t").unwrap(), vec![7]);
    }
}
