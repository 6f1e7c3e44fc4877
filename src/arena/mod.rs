//! Shared node storage for a whole document tree.
//!
//! Every object and array of one tree threads its own singly linked list
//! through `Arena::nodes`. Lists never interleave: a node's `next` always
//! points at a node of the same list, even though nodes of different lists
//! sit side by side in storage.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::constants::DEFAULT_BUFFER_CAPACITY;
use crate::text::Charset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(usize);

impl ListId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Value stored in a node slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot {
    #[default]
    Null,
    /// Quoted scalar text.
    Text(SmolStr),
    /// Unquoted scalar text (numbers, `true`, `false`, `null`).
    Literal(SmolStr),
    /// Nested object or array living in the same arena.
    List(ListId),
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub key: Option<SmolStr>,
    pub value: Slot,
    pub next: Option<NodeId>,
}

/// Per-document bookkeeping: the bounds and length of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub is_array: bool,
    pub head: Option<NodeId>,
    pub tail: Option<NodeId>,
    pub count: usize,
}

impl ListHeader {
    pub fn new(is_array: bool) -> Self {
        Self {
            is_array,
            head: None,
            tail: None,
            count: 0,
        }
    }
}

const MIN_OUTPUT_CAPACITY: usize = 16;

type KeyIndex = FxHashMap<(NodeId, SmolStr), NodeId>;

#[derive(Debug)]
pub struct Arena {
    nodes: Vec<Node>,
    lists: Vec<ListHeader>,
    key_index: Option<KeyIndex>,
    output: Vec<u8>,
    buffer_capacity: usize,
    charset: Charset,
}

/// Read-only view over nodes and list headers, split off the output buffer
/// so serialization can borrow both at once.
#[derive(Clone, Copy)]
pub(crate) struct Tree<'a> {
    pub nodes: &'a [Node],
    pub lists: &'a [ListHeader],
    pub charset: Charset,
}

impl Tree<'_> {
    pub fn walk(&self, list: ListId) -> ListWalk<'_> {
        let header = self.lists[list.0];
        ListWalk {
            nodes: self.nodes,
            next: header.head,
            remaining: header.count,
        }
    }
}

pub struct ListWalk<'a> {
    nodes: &'a [Node],
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for ListWalk<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let node = &self.nodes[id.0];
        self.next = node.next;
        self.remaining -= 1;
        Some((id, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::with_capacity(0, DEFAULT_BUFFER_CAPACITY, Charset::default())
    }

    pub fn with_capacity(node_capacity: usize, buffer_capacity: usize, charset: Charset) -> Self {
        Self {
            nodes: Vec::with_capacity(node_capacity),
            lists: Vec::new(),
            key_index: None,
            output: Vec::new(),
            buffer_capacity,
            charset,
        }
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Number of node slots handed out so far, reachable or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn output_capacity(&self) -> usize {
        self.output.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn list(&self, id: ListId) -> ListHeader {
        self.lists[id.0]
    }

    pub(crate) fn set_list(&mut self, id: ListId, header: ListHeader) {
        self.lists[id.0] = header;
    }

    pub fn new_list(&mut self, is_array: bool) -> ListId {
        self.lists.push(ListHeader::new(is_array));
        ListId(self.lists.len() - 1)
    }

    pub fn walk(&self, head: Option<NodeId>, count: usize) -> ListWalk<'_> {
        ListWalk {
            nodes: &self.nodes,
            next: head,
            remaining: count,
        }
    }

    /// Hand out the next free slot. Storage doubles when exhausted; existing
    /// slots keep their index.
    pub fn allocate_slot(&mut self) -> NodeId {
        if self.nodes.len() == self.nodes.capacity() {
            let grow_by = self.nodes.capacity().max(1);
            tracing::debug!(
                from = self.nodes.capacity(),
                to = self.nodes.capacity() + grow_by,
                "growing node storage"
            );
            self.nodes.reserve_exact(grow_by);
        }
        self.nodes.push(Node::default());
        NodeId(self.nodes.len() - 1)
    }

    /// Store `key`/`value` in a fresh slot and link it after `tail`.
    ///
    /// The arena does not track list bounds; the caller updates its own
    /// head/tail from the returned index. When `tail` is `None` the returned
    /// index is the new head.
    pub fn append(
        &mut self,
        key: Option<SmolStr>,
        value: Slot,
        head: Option<NodeId>,
        tail: Option<NodeId>,
    ) -> NodeId {
        let index = self.allocate_slot();
        let head = match tail {
            Some(tail) => {
                self.nodes[tail.0].next = Some(index);
                head.unwrap_or(index)
            }
            None => index,
        };
        if let (Some(index_map), Some(key)) = (self.key_index.as_mut(), key.as_ref()) {
            index_map.entry((head, key.clone())).or_insert(index);
        }
        let node = &mut self.nodes[index.0];
        node.key = key;
        node.value = value;
        node.next = None;
        index
    }

    /// First node keyed `key` among the `count` nodes starting at `head`.
    pub fn lookup(&self, key: &str, head: Option<NodeId>, count: usize) -> Option<&Slot> {
        let head_id = head?;
        if let Some(index_map) = &self.key_index {
            return index_map
                .get(&(head_id, SmolStr::new(key)))
                .map(|id| &self.nodes[id.0].value);
        }
        self.walk(head, count)
            .find(|(_, node)| node.key.as_deref() == Some(key))
            .map(|(_, node)| &node.value)
    }

    pub fn has_index(&self) -> bool {
        self.key_index.is_some()
    }

    /// Create the key index if absent, covering every list already stored.
    pub fn enable_index(&mut self) {
        if self.key_index.is_some() {
            return;
        }
        let mut index_map = KeyIndex::default();
        for header in self.lists.iter().filter(|header| !header.is_array) {
            let Some(head) = header.head else {
                continue;
            };
            for (id, node) in self.walk(header.head, header.count) {
                if let Some(key) = &node.key {
                    index_map.entry((head, key.clone())).or_insert(id);
                }
            }
        }
        tracing::debug!(keys = index_map.len(), "built key index");
        self.key_index = Some(index_map);
    }

    /// Cut `list` back to `saved`, unlinking the nodes appended since and
    /// dropping their key-index entries. The slots stay allocated.
    pub(crate) fn truncate_list(&mut self, list: ListId, saved: ListHeader) {
        let current = self.lists[list.0];
        let dropped = current.count.saturating_sub(saved.count);
        if dropped > 0 {
            if let Some(index_map) = self.key_index.as_mut() {
                let first = match saved.tail {
                    Some(tail) => self.nodes[tail.0].next,
                    None => current.head,
                };
                let head = saved.head.or(current.head);
                let mut stale: SmallVec<[(NodeId, SmolStr); 8]> = SmallVec::new();
                let walk = ListWalk {
                    nodes: &self.nodes,
                    next: first,
                    remaining: dropped,
                };
                for (id, node) in walk {
                    if let (Some(head), Some(key)) = (head, &node.key) {
                        if index_map.get(&(head, key.clone())) == Some(&id) {
                            stale.push((head, key.clone()));
                        }
                    }
                }
                for entry in &stale {
                    index_map.remove(entry);
                }
            }
        }
        if let Some(tail) = saved.tail {
            self.nodes[tail.0].next = None;
        }
        self.lists[list.0] = saved;
    }

    /// Output buffer sized for a serialization attempt, allocated on first use.
    pub(crate) fn output_parts(&mut self) -> (Tree<'_>, &mut [u8]) {
        if self.output.is_empty() {
            let capacity = if self.buffer_capacity == 0 {
                DEFAULT_BUFFER_CAPACITY
            } else {
                self.buffer_capacity
            };
            self.output = vec![0; capacity];
        }
        (
            Tree {
                nodes: &self.nodes,
                lists: &self.lists,
                charset: self.charset,
            },
            self.output.as_mut_slice(),
        )
    }

    pub(crate) fn output(&self) -> &[u8] {
        &self.output
    }

    /// Replace the output buffer with one twice the size. Contents are not
    /// preserved; callers retry the whole write.
    pub(crate) fn grow_output(&mut self) {
        let next = (self.output.len() << 1).max(MIN_OUTPUT_CAPACITY);
        tracing::debug!(from = self.output.len(), to = next, "growing output buffer");
        self.output = vec![0; next];
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Slot {
        Slot::Text(SmolStr::new(value))
    }

    fn push(arena: &mut Arena, header: &mut ListHeader, key: Option<&str>, value: Slot) {
        let id = arena.append(key.map(SmolStr::new), value, header.head, header.tail);
        if header.head.is_none() {
            header.head = Some(id);
        }
        header.tail = Some(id);
        header.count += 1;
    }

    #[rstest::rstest]
    fn test_allocate_slot_doubles_and_keeps_indices() {
        let mut arena = Arena::with_capacity(2, 16, Charset::Utf8);
        let ids: Vec<NodeId> = (0..5).map(|_| arena.allocate_slot()).collect();
        assert_eq!(ids.iter().map(|id| id.index()).collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
        assert!(arena.node_capacity() >= 8);
    }

    #[rstest::rstest]
    fn test_append_links_after_tail() {
        let mut arena = Arena::new();
        let mut header = ListHeader::new(false);
        push(&mut arena, &mut header, Some("a"), text("1"));
        push(&mut arena, &mut header, Some("b"), text("2"));

        let head = header.head.unwrap();
        assert_eq!(arena.node(head).next, header.tail);
        assert_eq!(arena.node(header.tail.unwrap()).next, None);
    }

    #[rstest::rstest]
    fn test_interleaved_lists_stay_separate() {
        let mut arena = Arena::new();
        let mut left = ListHeader::new(true);
        let mut right = ListHeader::new(true);
        for i in 0..4 {
            push(&mut arena, &mut left, None, text(&format!("l{i}")));
            push(&mut arena, &mut right, None, text(&format!("r{i}")));
        }
        let left_values: Vec<_> = arena
            .walk(left.head, left.count)
            .map(|(_, node)| node.value.clone())
            .collect();
        assert_eq!(left_values, ["l0", "l1", "l2", "l3"].map(text));
    }

    #[rstest::rstest]
    fn test_lookup_first_match_wins_with_and_without_index() {
        let mut arena = Arena::new();
        let mut header = ListHeader::new(false);
        push(&mut arena, &mut header, Some("k"), text("first"));
        push(&mut arena, &mut header, Some("k"), text("second"));

        assert_eq!(arena.lookup("k", header.head, header.count), Some(&text("first")));
        arena.enable_index();
        assert_eq!(arena.lookup("k", header.head, header.count), Some(&text("first")));
        assert_eq!(arena.lookup("missing", header.head, header.count), None);
    }

    #[rstest::rstest]
    fn test_lookup_on_empty_list() {
        let mut arena = Arena::new();
        assert_eq!(arena.lookup("k", None, 0), None);
        arena.enable_index();
        assert_eq!(arena.lookup("k", None, 0), None);
    }

    #[rstest::rstest]
    fn test_enable_index_is_idempotent_and_covers_existing_nodes() {
        let mut arena = Arena::new();
        let list = arena.new_list(false);
        let mut header = arena.list(list);
        push(&mut arena, &mut header, Some("x"), text("1"));
        arena.set_list(list, header);

        arena.enable_index();
        arena.enable_index();
        assert!(arena.has_index());
        assert_eq!(arena.lookup("x", header.head, header.count), Some(&text("1")));
    }

    #[rstest::rstest]
    fn test_truncate_list_drops_index_entries() {
        let mut arena = Arena::new();
        arena.enable_index();
        let list = arena.new_list(false);
        let mut header = arena.list(list);
        push(&mut arena, &mut header, Some("keep"), text("1"));
        let saved = header;
        push(&mut arena, &mut header, Some("drop"), text("2"));
        arena.set_list(list, header);

        arena.truncate_list(list, saved);
        let restored = arena.list(list);
        assert_eq!(restored, saved);
        assert_eq!(arena.lookup("drop", restored.head, restored.count), None);
        assert_eq!(arena.lookup("keep", restored.head, restored.count), Some(&text("1")));
        assert_eq!(arena.node(restored.tail.unwrap()).next, None);
    }

    #[rstest::rstest]
    fn test_grow_output_doubles() {
        let mut arena = Arena::with_capacity(0, 4096, Charset::Utf8);
        let _ = arena.output_parts();
        assert_eq!(arena.output_capacity(), 4096);
        arena.grow_output();
        assert_eq!(arena.output_capacity(), 8192);
    }
}
