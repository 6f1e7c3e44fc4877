//! Permissive single-pass parser.
//!
//! Input is scanned in place: each object/array body is walked once, values
//! are delimited by bracket matching or by the next unquoted separator, and
//! entries go straight into the target document. There is no token stream
//! and no escape handling; quoted text is stored as it appears between the
//! quotes.

pub mod scan;

use smol_str::SmolStr;

use crate::arena::ListHeader;
use crate::constants::MAX_DEPTH;
use crate::document::{Document, Value};
use crate::options::DocumentOptions;
use crate::text::Charset;
use crate::{Error, Result};

use self::scan::{find_unquoted, match_bracket, scalar, scalar_end, skip_space, trim, Scalar};

/// Parse a whole object or array into a new tree. The root's kind follows
/// the input, whatever `options.is_array` says.
pub fn parse_document(bytes: &[u8], options: &DocumentOptions) -> Result<Document> {
    let (start, end) = root_range(bytes)?;
    let is_array = bytes[start] == b'[';
    let doc = Document::with_options(options.clone().with_array(is_array));
    parse_range(&doc, bytes, start, end)?;
    Ok(doc)
}

/// Append the entries of `bytes` to an existing document of the same kind.
pub fn parse_into(doc: &Document, bytes: &[u8]) -> Result<()> {
    let (start, end) = root_range(bytes)?;
    let is_array = bytes[start] == b'[';
    if is_array != doc.is_array() {
        return Err(Error::KindMismatch {
            expected: kind_name(doc.is_array()),
            found: kind_name(is_array),
        });
    }
    parse_range(doc, bytes, start, end)
}

fn kind_name(is_array: bool) -> &'static str {
    if is_array {
        "array"
    } else {
        "object"
    }
}

/// Trimmed range of the root value, checked to open with `{` or `[`.
fn root_range(bytes: &[u8]) -> Result<(usize, usize)> {
    let (start, end) = trim(bytes, 0, bytes.len());
    if start == end {
        return Err(Error::Empty);
    }
    match bytes[start] {
        b'{' | b'[' => Ok((start, end)),
        byte => Err(Error::UnexpectedStart {
            byte,
            offset: start,
        }),
    }
}

/// The root only has to end in its own closing bracket; the body walk finds
/// the structure, so quoted brackets at the top level are fine.
fn parse_range(doc: &Document, bytes: &[u8], start: usize, end: usize) -> Result<()> {
    let close = if bytes[start] == b'[' { b']' } else { b'}' };
    if end - start < 2 || bytes[end - 1] != close {
        return Err(Error::UnterminatedValue { offset: start });
    }
    doc.enable_index();
    let parser = Parser {
        bytes,
        charset: doc.charset(),
    };
    parser.parse_list(doc, start, end, 0)
}

struct Parser<'a> {
    bytes: &'a [u8],
    charset: Charset,
}

impl Parser<'_> {
    /// Fill `doc` from the bracketed range `[start, end)`. On failure the
    /// document is cut back to what it held before.
    fn parse_list(&self, doc: &Document, start: usize, end: usize, depth: usize) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Err(Error::DepthLimit);
        }
        let saved: ListHeader = doc.header();
        let result = if doc.is_array() {
            self.parse_array_body(doc, start, end, depth)
        } else {
            self.parse_object_body(doc, start, end, depth)
        };
        if let Err(err) = &result {
            tracing::trace!(error = %err, restored = saved.count, "rolling back document");
            doc.restore(saved);
        }
        result
    }

    fn parse_object_body(&self, doc: &Document, start: usize, end: usize, depth: usize) -> Result<()> {
        let body_end = end - 1;
        let mut pos = start + 1;
        loop {
            pos = skip_space(self.bytes, pos, body_end);
            if pos >= body_end {
                return Ok(());
            }
            let colon = find_unquoted(self.bytes, pos, body_end, b':')
                .ok_or(Error::MissingColon { offset: pos })?;
            let key = self.key(pos, colon)?;
            let value_start = skip_space(self.bytes, colon + 1, body_end);
            let value_end = self.value(doc, Some(key), value_start, end, depth)?;
            pos = self.after_value(value_end, body_end)?;
        }
    }

    fn parse_array_body(&self, doc: &Document, start: usize, end: usize, depth: usize) -> Result<()> {
        let body_end = end - 1;
        let mut pos = start + 1;
        loop {
            pos = skip_space(self.bytes, pos, body_end);
            if pos >= body_end {
                return Ok(());
            }
            let value_end = self.value(doc, None, pos, end, depth)?;
            pos = self.after_value(value_end, body_end)?;
        }
    }

    /// Parse the value at `start` into `doc` and return where it ends.
    /// `end` is the exclusive end of the enclosing list, closing bracket
    /// included.
    fn value(
        &self,
        doc: &Document,
        key: Option<SmolStr>,
        start: usize,
        end: usize,
        depth: usize,
    ) -> Result<usize> {
        let body_end = end - 1;
        if start >= body_end {
            return Err(Error::MissingValue { offset: start });
        }
        match self.bytes[start] {
            open @ (b'{' | b'[') => {
                let close = match_bracket(self.bytes, start, end)
                    .filter(|&close| close <= body_end)
                    .ok_or(Error::UnterminatedValue { offset: start })?;
                let child = doc.derive(key, open == b'[');
                self.parse_list(&child, start, close, depth + 1)?;
                Ok(close)
            }
            _ => {
                let stop = scalar_end(self.bytes, start, end)
                    .ok_or(Error::UnterminatedValue { offset: start })?;
                let value = match scalar(self.bytes, start, stop)? {
                    Scalar::Quoted(raw) => Value::Text(SmolStr::from(self.charset.decode(raw))),
                    Scalar::Bare(raw) => Value::Literal(SmolStr::from(self.charset.decode(raw))),
                };
                doc.append_entry(key, value);
                Ok(stop)
            }
        }
    }

    fn key(&self, start: usize, colon: usize) -> Result<SmolStr> {
        let raw = match scalar(self.bytes, start, colon) {
            Ok(Scalar::Quoted(raw)) | Ok(Scalar::Bare(raw)) => raw,
            Err(Error::MissingValue { offset }) => return Err(Error::MissingKey { offset }),
            Err(err) => return Err(err),
        };
        Ok(SmolStr::from(Charset::KEY.decode(raw)))
    }

    /// Step over the separator following a value. A trailing separator before
    /// the closing bracket is tolerated.
    fn after_value(&self, pos: usize, body_end: usize) -> Result<usize> {
        let pos = skip_space(self.bytes, pos, body_end);
        if pos >= body_end {
            return Ok(pos);
        }
        if self.bytes[pos] == b',' {
            return Ok(pos + 1);
        }
        Err(Error::ExpectedComma { offset: pos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(input: &str) -> Result<Document> {
        parse_document(input.as_bytes(), &DocumentOptions::default())
    }

    #[rstest]
    fn test_parse_object() {
        let doc = parse(r#"{"a":1,"b":"two","c":[1,2,3]}"#).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("a"), Some(Value::literal("1")));
        assert_eq!(doc.get("b"), Some(Value::from("two")));
        let c = doc.get("c").unwrap().into_document().unwrap();
        assert!(c.is_array());
        assert_eq!(c.len(), 3);
    }

    #[rstest]
    fn test_parse_with_whitespace() {
        let doc = parse(" \n{ \"a\" : 1 ,\t\"b\" : { \"c\" : [ 1 , 2 ] } \r\n}\n").unwrap();
        assert_eq!(doc.to_text().unwrap(), r#"{"a":1,"b":{"c":[1,2]}}"#);
    }

    #[rstest]
    fn test_scalars_stay_text() {
        let doc = parse(r#"[1, -2.5e3, true, false, null, "null"]"#).unwrap();
        let values: Vec<Value> = doc.iter().map(|entry| entry.value).collect();
        assert_eq!(
            values,
            vec![
                Value::literal("1"),
                Value::literal("-2.5e3"),
                Value::literal("true"),
                Value::literal("false"),
                Value::literal("null"),
                Value::from("null"),
            ]
        );
    }

    #[rstest]
    fn test_trailing_comma_tolerated() {
        let doc = parse("[1,2,]").unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[rstest]
    #[case("", "input is empty")]
    #[case("   \n", "input is empty")]
    #[case("x", "unexpected byte 0x78 at offset 0, expected '{' or '['")]
    #[case(r#"{"a":}"#, "missing value at offset 5")]
    #[case(r#"{"a" 1}"#, "missing ':' after key at offset 1")]
    #[case(r#"{:1}"#, "missing key at offset 1")]
    #[case(r#"{"a":1"#, "unterminated value starting at offset 0")]
    #[case(r#"{"a":{"b":1}"#, "unterminated value starting at offset 5")]
    #[case(r#"{"a":1]"#, "unterminated value starting at offset 0")]
    #[case("[", "unterminated value starting at offset 0")]
    #[case(r#"{"a":"x}"#, "unterminated value starting at offset 5")]
    #[case(r#"[{"a":1} 2]"#, "expected ',' at offset 9")]
    #[case(r#"[1,,2]"#, "missing value at offset 3")]
    fn test_malformed(#[case] input: &str, #[case] message: &str) {
        let err = parse(input).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    fn test_kind_mismatch() {
        let doc = Document::new();
        let err = doc.parse_into(b"[1]").unwrap_err();
        assert!(matches!(
            err,
            Error::KindMismatch {
                expected: "object",
                found: "array"
            }
        ));
    }
}
