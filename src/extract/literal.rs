//! Balanced literal scanner
//!
//! Finds the first balanced top-level `{ ... }` in free text. Brackets inside JSON
//! string literals are ignored; `{}` and `[]` must nest correctly.

use smallvec::SmallVec;

/// Why no balanced literal could be cut out of the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No opening brace anywhere
    NotFound,
    /// Text ended before the literal closed; carries the partial literal
    Unterminated(String),
    /// A closer did not match the innermost opener
    Mismatched {
        literal: String,
        expected: char,
        found: char,
    },
}

/// Return the first balanced object literal in `text`
///
/// An opener that never closes is skipped and the scan resumes at the
/// next `{`. When no candidate balances, the error from the earliest
/// opener is returned.
pub fn first_object(text: &str) -> Result<&str, ScanError> {
    let mut first_error = None;
    let mut from = 0;

    while let Some(found) = text[from..].find('{') {
        let start = from + found;
        match scan_from(&text[start..]) {
            Ok(literal) => return Ok(literal),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
        from = start + 1;
    }

    Err(first_error.unwrap_or(ScanError::NotFound))
}

/// Scan one candidate literal; `body` starts at its opening brace
fn scan_from(body: &str) -> Result<&str, ScanError> {
    // Stack of expected closers; most literals nest a handful of levels
    let mut closers: SmallVec<[char; 16]> = SmallVec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                let expected = closers.pop().unwrap_or('}');
                if ch != expected {
                    return Err(ScanError::Mismatched {
                        literal: body[..offset + ch.len_utf8()].to_string(),
                        expected,
                        found: ch,
                    });
                }
                if closers.is_empty() {
                    return Ok(&body[..offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    Err(ScanError::Unterminated(body.to_string()))
}
