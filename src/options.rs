use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUFFER_CAPACITY, DEFAULT_NODE_CAPACITY};
use crate::text::Charset;

/// Sizing and encoding options for a new document tree.
///
/// # Examples
/// ```
/// use arena_json::{Charset, DocumentOptions};
///
/// let opts = DocumentOptions::new()
///     .with_node_capacity(64)
///     .with_charset(Charset::Latin1);
/// assert_eq!(opts.node_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentOptions {
    pub node_capacity: usize,
    pub buffer_capacity: usize,
    pub is_array: bool,
    pub charset: Charset,
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    pub fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            is_array: false,
            charset: Charset::default(),
        }
    }
}
