//! Byte-level scanning helpers over `bytes[start..end)` ranges.
//!
//! None of these look at string escapes: a quote byte always toggles the
//! quoted state, and bracket matching counts brackets inside strings too.

use memchr::memchr2;

use crate::constants::is_space;
use crate::{Error, Result};

pub fn skip_space(bytes: &[u8], mut pos: usize, end: usize) -> usize {
    while pos < end && is_space(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Narrow `[start, end)` to exclude leading and trailing whitespace.
pub fn trim(bytes: &[u8], start: usize, mut end: usize) -> (usize, usize) {
    let start = skip_space(bytes, start, end);
    while end > start && is_space(bytes[end - 1]) {
        end -= 1;
    }
    (start, end)
}

/// First `target` byte outside quotes.
pub fn find_unquoted(bytes: &[u8], start: usize, end: usize, target: u8) -> Option<usize> {
    let mut quoted = false;
    for (offset, &byte) in bytes[start..end].iter().enumerate() {
        if byte == b'"' {
            quoted = !quoted;
        } else if !quoted && byte == target {
            return Some(start + offset);
        }
    }
    None
}

/// End (exclusive) of the bracketed value opening at `start`, found by depth
/// counting over brackets of the same kind.
pub fn match_bracket(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    let open = bytes[start];
    let close = match open {
        b'{' => b'}',
        b'[' => b']',
        _ => return None,
    };
    let mut depth = 1usize;
    let mut pos = start + 1;
    while pos < end {
        let found = pos + memchr2(open, close, &bytes[pos..end])?;
        if bytes[found] == open {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(found + 1);
            }
        }
        pos = found + 1;
    }
    None
}

/// Position of the first unquoted `,`, `}` or `]` after a scalar starting at
/// `start`.
pub fn scalar_end(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    let mut quoted = false;
    for (offset, &byte) in bytes[start..end].iter().enumerate() {
        match byte {
            b'"' => quoted = !quoted,
            b',' | b'}' | b']' if !quoted => return Some(start + offset),
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar<'a> {
    /// Content between the quotes.
    Quoted(&'a [u8]),
    Bare(&'a [u8]),
}

/// Classify the trimmed scalar text in `[start, end)`.
pub fn scalar(bytes: &[u8], start: usize, end: usize) -> Result<Scalar<'_>> {
    let (start, end) = trim(bytes, start, end);
    if start == end {
        return Err(Error::MissingValue { offset: start });
    }
    if bytes[start] != b'"' {
        return Ok(Scalar::Bare(&bytes[start..end]));
    }
    if end - start < 2 || bytes[end - 1] != b'"' {
        return Err(Error::UnterminatedString { offset: start });
    }
    Ok(Scalar::Quoted(&bytes[start + 1..end - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"  \t{}\r\n", (3, 5))]
    #[case(b"{}", (0, 2))]
    #[case(b"   ", (3, 3))]
    fn test_trim(#[case] input: &[u8], #[case] expected: (usize, usize)) {
        assert_eq!(trim(input, 0, input.len()), expected);
    }

    #[rstest]
    #[case(br#"{"a":{"b":1}},"#, Some(13))]
    #[case(br#"[[1],[2]] "#, Some(9))]
    #[case(br#"{"a":[1]}"#, Some(9))]
    #[case(br#"{"a":1"#, None)]
    fn test_match_bracket(#[case] input: &[u8], #[case] expected: Option<usize>) {
        assert_eq!(match_bracket(input, 0, input.len()), expected);
    }

    #[rstest]
    fn test_match_bracket_counts_brackets_inside_strings() {
        let input = br#"{"a":"}"}"#;
        assert_eq!(match_bracket(input, 0, input.len()), Some(7));
    }

    #[rstest]
    #[case(br#"1,2"#, Some(1))]
    #[case(br#""a,b"}"#, Some(5))]
    #[case(br#""x]" ]"#, Some(5))]
    #[case(br#""open"#, None)]
    fn test_scalar_end(#[case] input: &[u8], #[case] expected: Option<usize>) {
        assert_eq!(scalar_end(input, 0, input.len()), expected);
    }

    #[rstest]
    fn test_find_unquoted_skips_quoted_colon() {
        let input = br#""a:b": 1"#;
        assert_eq!(find_unquoted(input, 0, input.len(), b':'), Some(5));
        assert_eq!(find_unquoted(b"abc", 0, 3, b':'), None);
    }

    #[rstest]
    #[case(br#"  "two" "#, Scalar::Quoted(b"two"))]
    #[case(br#""""#, Scalar::Quoted(b""))]
    #[case(b" 12.5\n", Scalar::Bare(b"12.5"))]
    #[case(b"null", Scalar::Bare(b"null"))]
    fn test_scalar(#[case] input: &[u8], #[case] expected: Scalar<'static>) {
        assert_eq!(scalar(input, 0, input.len()).unwrap(), expected);
    }

    #[rstest]
    fn test_scalar_errors() {
        assert!(matches!(
            scalar(b"   ", 0, 3),
            Err(Error::MissingValue { offset: 3 })
        ));
        assert!(matches!(
            scalar(br#" "abc"#, 0, 5),
            Err(Error::UnterminatedString { offset: 1 })
        ));
        assert!(matches!(
            scalar(br#"""#, 0, 1),
            Err(Error::UnterminatedString { offset: 0 })
        ));
    }
}
