//! Object and array views over a shared [`Arena`].
//!
//! A [`Document`] is a cheap handle: a reference to the tree's arena plus the
//! id of its own list header. Cloning a handle does not copy any entries, and
//! every object/array of one tree shares the same arena. Handles are `!Send`;
//! a tree belongs to the thread that built it.

mod value;

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::arena::{Arena, ListHeader, ListId, NodeId, Slot};
use crate::constants::MAX_DEPTH;
use crate::options::DocumentOptions;
use crate::text::Charset;
use crate::{decode, encode, Result};

pub use value::{Entry, Value};

#[derive(Clone)]
pub struct Document {
    arena: Rc<RefCell<Arena>>,
    list: ListId,
}

impl Document {
    /// Empty root object with default sizing.
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// Empty root array with default sizing.
    pub fn new_array() -> Self {
        Self::with_options(DocumentOptions::default().with_array(true))
    }

    /// Empty root backed by a new arena.
    pub fn with_options(options: DocumentOptions) -> Self {
        let mut arena = Arena::with_capacity(
            options.node_capacity,
            options.buffer_capacity,
            options.charset,
        );
        let list = arena.new_list(options.is_array);
        Self {
            arena: Rc::new(RefCell::new(arena)),
            list,
        }
    }

    /// Parse one JSON object or array into a new tree.
    ///
    /// # Examples
    /// ```
    /// use arena_json::Document;
    ///
    /// let doc = Document::parse(br#"{"a":1,"b":"two"}"#).unwrap();
    /// assert_eq!(doc.get_str("b").as_deref(), Some("two"));
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        decode::parse_document(bytes, &DocumentOptions::default())
    }

    pub fn parse_with_options(bytes: &[u8], options: &DocumentOptions) -> Result<Self> {
        decode::parse_document(bytes, options)
    }

    /// Parse `bytes` and append the entries to this document.
    ///
    /// On failure the document is restored to its length before the call.
    /// Slots already handed out for the failed attempt stay allocated.
    pub fn parse_into(&self, bytes: &[u8]) -> Result<()> {
        decode::parse_into(self, bytes)
    }

    pub(crate) fn from_parts(arena: Rc<RefCell<Arena>>, list: ListId) -> Self {
        Self { arena, list }
    }

    pub(crate) fn header(&self) -> ListHeader {
        self.arena.borrow().list(self.list)
    }

    pub(crate) fn restore(&self, saved: ListHeader) {
        self.arena.borrow_mut().truncate_list(self.list, saved);
    }

    pub fn is_array(&self) -> bool {
        self.header().is_array
    }

    /// Number of entries, including those whose value is `Null`.
    pub fn len(&self) -> usize {
        self.header().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn charset(&self) -> Charset {
        self.arena.borrow().charset()
    }

    /// Whether both handles view the same list of the same tree.
    pub fn same_tree(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }

    /// Node slots handed out by the tree's arena so far.
    pub fn node_count(&self) -> usize {
        self.arena.borrow().node_count()
    }

    /// Current size of the tree's output buffer.
    pub fn output_capacity(&self) -> usize {
        self.arena.borrow().output_capacity()
    }

    /// Build the key index for the whole tree. Lookups become O(1) instead of
    /// a walk over the list.
    pub fn enable_index(&self) {
        self.arena.borrow_mut().enable_index();
    }

    pub fn has_index(&self) -> bool {
        self.arena.borrow().has_index()
    }

    /// Append `value` under `key`. In an array the key is dropped.
    ///
    /// A [`Value::Document`] from another tree is deep-copied. If it nests
    /// deeper than [`MAX_DEPTH`] the copy is abandoned and the entry is stored
    /// as [`Value::Null`], so it is counted but never serialized; a warning is
    /// logged.
    pub fn append(&self, key: impl Into<SmolStr>, value: impl Into<Value>) {
        self.append_entry(Some(key.into()), value.into());
    }

    /// Append `value` without a key. Foreign documents are copied as in
    /// [`Document::append`].
    pub fn push(&self, value: impl Into<Value>) {
        self.append_entry(None, value.into());
    }

    pub(crate) fn append_entry(&self, key: Option<SmolStr>, value: Value) -> NodeId {
        let slot = self.slot_for(value, 0);
        self.append_slot(key, slot)
    }

    fn append_slot(&self, key: Option<SmolStr>, slot: Slot) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        let mut header = arena.list(self.list);
        let key = if header.is_array { None } else { key };
        let index = arena.append(key, slot, header.head, header.tail);
        if header.head.is_none() {
            header.head = Some(index);
        }
        header.tail = Some(index);
        header.count += 1;
        arena.set_list(self.list, header);
        index
    }

    fn slot_for(&self, value: Value, depth: usize) -> Slot {
        match value {
            Value::Null => Slot::Null,
            Value::Text(text) => Slot::Text(text),
            Value::Literal(text) => Slot::Literal(text),
            Value::Document(doc) if self.same_tree(&doc) => Slot::List(doc.list),
            Value::Document(doc) => match self.graft(&doc, depth) {
                Some(list) => Slot::List(list),
                None => {
                    tracing::warn!("nesting too deep to copy into this tree; storing null");
                    Slot::Null
                }
            },
        }
    }

    /// Deep-copy a document from another tree into a new list of this arena.
    fn graft(&self, source: &Document, depth: usize) -> Option<ListId> {
        if depth >= MAX_DEPTH {
            return None;
        }
        let list = self.arena.borrow_mut().new_list(source.is_array());
        let target = Document::from_parts(self.arena.clone(), list);
        for entry in source.iter() {
            let slot = match entry.value {
                Value::Document(child) if !target.same_tree(&child) => {
                    Slot::List(target.graft(&child, depth + 1)?)
                }
                other => target.slot_for(other, depth + 1),
            };
            target.append_slot(entry.key, slot);
        }
        Some(list)
    }

    /// Value stored under `key`; the first match wins when a key repeats.
    pub fn get(&self, key: &str) -> Option<Value> {
        let arena = self.arena.borrow();
        let header = arena.list(self.list);
        arena
            .lookup(key, header.head, header.count)
            .map(|slot| Value::from_slot(slot, &self.arena))
    }

    /// Text of a scalar field, or the serialized form of a nested one.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Text(text) | Value::Literal(text) => Some(text.to_string()),
            Value::Document(doc) => doc.to_text().ok(),
            Value::Null => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let arena = self.arena.borrow();
        let header = arena.list(self.list);
        arena.lookup(key, header.head, header.count).is_some()
    }

    /// Nested object stored under `key`, sharing this tree's arena.
    pub fn derive_object(&self, key: impl Into<SmolStr>) -> Document {
        self.derive(Some(key.into()), false)
    }

    /// Nested array stored under `key`, sharing this tree's arena.
    pub fn derive_array(&self, key: impl Into<SmolStr>) -> Document {
        self.derive(Some(key.into()), true)
    }

    /// Nested object appended as an unkeyed element.
    pub fn push_object(&self) -> Document {
        self.derive(None, false)
    }

    /// Nested array appended as an unkeyed element.
    pub fn push_array(&self) -> Document {
        self.derive(None, true)
    }

    pub(crate) fn derive(&self, key: Option<SmolStr>, is_array: bool) -> Document {
        let child = self.detached(is_array);
        self.append_slot(key, Slot::List(child.list));
        child
    }

    /// New empty list in this arena, not linked into any document.
    fn detached(&self, is_array: bool) -> Document {
        let list = self.arena.borrow_mut().new_list(is_array);
        Document::from_parts(self.arena.clone(), list)
    }

    /// The field under `key` seen as an array.
    ///
    /// An existing array is returned as is. A missing or null field gives an
    /// empty array, any other value a one-element array holding it. Both live
    /// in their own small arena and leave this tree's storage untouched; a
    /// wrapped object is copied into the view.
    pub fn array_view(&self, key: &str) -> Document {
        match self.get(key) {
            Some(Value::Document(doc)) if doc.is_array() => doc,
            None | Some(Value::Null) => self.standalone_array(),
            Some(other) => {
                let view = self.standalone_array();
                view.push(other);
                view
            }
        }
    }

    fn standalone_array(&self) -> Document {
        Document::with_options(
            DocumentOptions::new()
                .with_array(true)
                .with_node_capacity(1)
                .with_charset(self.charset()),
        )
    }

    /// Entries in list order, null-valued ones included.
    pub fn iter(&self) -> Entries {
        let header = self.header();
        Entries {
            arena: self.arena.clone(),
            next: header.head,
            remaining: header.count,
        }
    }

    /// Serialize into the tree's output buffer, growing it until the output
    /// fits. Returns the number of bytes written.
    pub fn serialize(&self, include_brackets: bool) -> Result<usize> {
        encode::serialize(&mut self.arena.borrow_mut(), self.list, include_brackets)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let len = self.serialize(true)?;
        Ok(self.arena.borrow().output()[..len].to_vec())
    }

    /// Serialized JSON decoded with the tree's charset.
    pub fn to_text(&self) -> Result<String> {
        let len = self.serialize(true)?;
        let arena = self.arena.borrow();
        Ok(arena.charset().decode(&arena.output()[..len]))
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let len = self.serialize(true)?;
        writer.write_all(&self.arena.borrow().output()[..len])?;
        Ok(len)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles are equal when they view the same list of the same tree.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.same_tree(other) && self.list == other.list
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("Document")
            .field("list", &self.list.index())
            .field("is_array", &header.is_array)
            .field("len", &header.count)
            .finish()
    }
}

impl IntoIterator for &Document {
    type Item = Entry;
    type IntoIter = Entries;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a snapshot of a document's length.
pub struct Entries {
    arena: Rc<RefCell<Arena>>,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Entries {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let arena = self.arena.borrow();
        let node = arena.node(id);
        self.next = node.next;
        self.remaining -= 1;
        Some(Entry {
            key: node.key.clone(),
            value: Value::from_slot(&node.value, &self.arena),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
