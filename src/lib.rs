//! In-place JSON document model.
//!
//! A parsed or built tree lives in one [`arena::Arena`]: every object and
//! array is a [`Document`] view threading its own linked list through the
//! arena's node storage, with an optional key index for O(1) lookups.
//!
//! ```
//! let doc = arena_json::parse_str(r#"{"a":1,"b":"two","c":[1,2,3]}"#).unwrap();
//! assert_eq!(doc.get_str("b").as_deref(), Some("two"));
//!
//! let arr = doc.derive_array("more");
//! arr.push(4);
//! assert_eq!(
//!     arena_json::to_string(&doc).unwrap(),
//!     r#"{"a":1,"b":"two","c":[1,2,3],"more":[4]}"#
//! );
//! ```

pub mod arena;
pub mod constants;
pub mod convert;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod options;
pub mod text;

use std::io::Write;

pub use crate::document::{Document, Entries, Entry, Value};
pub use crate::error::Error;
pub use crate::options::DocumentOptions;
pub use crate::text::Charset;

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse(input: &[u8]) -> Result<Document> {
    parse_with_options(input, &DocumentOptions::default())
}

pub fn parse_str(input: &str) -> Result<Document> {
    parse(input.as_bytes())
}

pub fn parse_with_options(input: &[u8], options: &DocumentOptions) -> Result<Document> {
    decode::parse_document(input, options)
}

pub fn to_vec(doc: &Document) -> Result<Vec<u8>> {
    doc.to_bytes()
}

pub fn to_string(doc: &Document) -> Result<String> {
    doc.to_text()
}

pub fn to_writer<W: Write>(writer: W, doc: &Document) -> Result<()> {
    doc.write_to(writer).map(|_| ())
}
