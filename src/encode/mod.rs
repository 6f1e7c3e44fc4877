//! Serialization of a document's list into the arena's output buffer.
//!
//! A write into a too-small buffer stops at the first overflowing write;
//! [`serialize`] then doubles the buffer and starts over until the whole
//! tree fits.

pub(crate) mod writer;

use crate::arena::{Arena, ListId, Slot, Tree};
use crate::constants::MAX_DEPTH;
use crate::{Error, Result};

use self::writer::{Overflow, Writer};

#[derive(Debug)]
enum WriteError {
    Overflow,
    DepthLimit,
}

impl From<Overflow> for WriteError {
    fn from(_: Overflow) -> Self {
        WriteError::Overflow
    }
}

/// Serialize `list` into the arena's output buffer, growing the buffer until
/// it fits. Returns the number of bytes written.
pub(crate) fn serialize(arena: &mut Arena, list: ListId, include_brackets: bool) -> Result<usize> {
    loop {
        let (tree, buffer) = arena.output_parts();
        let mut writer = Writer::new(buffer);
        match write_list(&tree, list, include_brackets, &mut writer, 0) {
            Ok(()) => return Ok(writer.position()),
            Err(WriteError::Overflow) => arena.grow_output(),
            Err(WriteError::DepthLimit) => return Err(Error::DepthLimit),
        }
    }
}

fn write_list(
    tree: &Tree<'_>,
    list: ListId,
    include_brackets: bool,
    writer: &mut Writer<'_>,
    depth: usize,
) -> std::result::Result<(), WriteError> {
    if depth >= MAX_DEPTH {
        return Err(WriteError::DepthLimit);
    }
    let header = tree.lists[list.index()];
    let (open, close) = if header.is_array {
        (b'[', b']')
    } else {
        (b'{', b'}')
    };
    if include_brackets {
        writer.write_byte(open)?;
    }

    let mut written = 0usize;
    for (_, node) in tree.walk(list) {
        if matches!(node.value, Slot::Null) {
            continue;
        }
        if written > 0 {
            writer.write_byte(b',')?;
        }
        if let Some(key) = &node.key {
            writer.write_key(key)?;
        }
        match &node.value {
            Slot::Text(text) => writer.write_quoted(text, tree.charset)?,
            Slot::Literal(text) => writer.write_encoded(text, tree.charset)?,
            Slot::List(child) => write_list(tree, *child, true, writer, depth + 1)?,
            Slot::Null => {}
        }
        written += 1;
    }

    if include_brackets {
        writer.write_byte(close)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Document, DocumentOptions, Value};

    #[rstest::rstest]
    fn test_nested_array() {
        let doc = Document::new();
        let arr = doc.derive_array("arr");
        arr.push(1);
        arr.push(2);
        arr.push(3);
        assert_eq!(doc.to_text().unwrap(), r#"{"arr":[1,2,3]}"#);
    }

    #[rstest::rstest]
    fn test_without_brackets() {
        let doc = Document::new();
        doc.append("a", "x");
        doc.append("b", 2);
        let len = doc.serialize(false).unwrap();
        assert_eq!(len, r#""a":"x","b":2"#.len());
    }

    #[rstest::rstest]
    fn test_null_entries_leave_no_separator() {
        let doc = Document::new_array();
        doc.push(Value::Null);
        doc.push(1);
        doc.push(Value::Null);
        doc.push(2);
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.to_text().unwrap(), "[1,2]");
    }

    #[rstest::rstest]
    fn test_grows_tiny_buffer() {
        let doc = Document::with_options(DocumentOptions::new().with_buffer_capacity(2));
        doc.append("message", "hello world");
        assert_eq!(doc.to_text().unwrap(), r#"{"message":"hello world"}"#);
        assert!(doc.output_capacity() >= 25);
    }

    #[rstest::rstest]
    fn test_self_link_hits_depth_limit() {
        let doc = Document::new();
        doc.append("me", doc.clone());
        assert!(matches!(doc.to_bytes(), Err(crate::Error::DepthLimit)));
    }
}
