use std::cell::RefCell;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::arena::{Arena, Slot};

use super::Document;

/// A field or element value as seen by callers.
///
/// Scalars are never type-converted: `Literal` keeps the raw text of an
/// unquoted number, `true`, `false` or `null`, and `Text` the content of a
/// quoted string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Present but omitted on output.
    Null,
    Text(SmolStr),
    Literal(SmolStr),
    Document(Document),
}

impl Value {
    pub(crate) fn from_slot(slot: &Slot, arena: &Rc<RefCell<Arena>>) -> Self {
        match slot {
            Slot::Null => Value::Null,
            Slot::Text(text) => Value::Text(text.clone()),
            Slot::Literal(text) => Value::Literal(text.clone()),
            Slot::List(list) => Value::Document(Document::from_parts(arena.clone(), *list)),
        }
    }

    pub fn literal(text: impl Into<SmolStr>) -> Self {
        Value::Literal(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar text, quoted or not.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) | Value::Literal(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(SmolStr::new(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(SmolStr::from(value))
    }
}

impl From<SmolStr> for Value {
    fn from(value: SmolStr) -> Self {
        Value::Text(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        let mut buf = [0u8; 4];
        Value::Text(SmolStr::new(value.encode_utf8(&mut buf)))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Literal(SmolStr::new_static(if value { "true" } else { "false" }))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    let mut buf = itoa::Buffer::new();
                    Value::Literal(SmolStr::new(buf.format(value)))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON spelling and become `Null`.
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return Value::Null;
        }
        let mut buf = ryu::Buffer::new();
        Value::Literal(SmolStr::new(buf.format_finite(value)))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        if !value.is_finite() {
            return Value::Null;
        }
        let mut buf = ryu::Buffer::new();
        Value::Literal(SmolStr::new(buf.format_finite(value)))
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// One entry of a document's list, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Option<SmolStr>,
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from(42i64), "42")]
    #[case(Value::from(-7i32), "-7")]
    #[case(Value::from(1.5f64), "1.5")]
    #[case(Value::from(true), "true")]
    #[case(Value::from(false), "false")]
    fn test_literals(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value, Value::literal(expected));
        assert_eq!(value.as_str(), Some(expected));
    }

    #[rstest]
    fn test_text_and_null() {
        assert_eq!(Value::from("two"), Value::Text(SmolStr::new("two")));
        assert_eq!(Value::from('c'), Value::Text(SmolStr::new("c")));
        assert!(Value::from(None::<i32>).is_null());
        assert!(Value::from(f64::NAN).is_null());
        assert_eq!(Value::Null.as_str(), None);
    }
}
