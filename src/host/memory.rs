//! In-memory reference host.
//!
//! A minimal flat-tree runtime implementing [`HostApi`]: a slot arena of
//! node records with parent/children links, insert-before-marker
//! semantics, and a free-index pool so discarded slots are reused.
//!
//! This is a test collaborator, not a renderer. It exists so the tracking
//! algorithm can be exercised against real structural mutations, and so
//! the contract in [`HostApi`] has one executable interpretation.

use std::collections::HashMap;

use bitflags::bitflags;

use super::HostApi;
use crate::types::{ElementId, Markup, Value};

// =============================================================================
// Node Records
// =============================================================================

bitflags! {
    /// How a property was set on a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PropFlags: u8 {
        /// Set through the attribute path.
        const ATTRIBUTE = 1 << 0;
        /// Set as an inline style entry.
        const CSS = 1 << 1;
    }
}

/// Stored property value plus how it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropEntry {
    pub value: String,
    pub flags: PropFlags,
}

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A named element.
    Tag,
    /// A text node.
    Text,
    /// A container of siblings, consumed on attach.
    Fragment,
}

#[derive(Debug)]
struct NodeRecord {
    kind: NodeKind,
    /// Tag name for elements, content for text nodes, empty for fragments.
    label: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    props: HashMap<String, PropEntry>,
}

impl NodeRecord {
    fn new(kind: NodeKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            parent: None,
            children: Vec::new(),
            props: HashMap::new(),
        }
    }
}

// =============================================================================
// Memory Host
// =============================================================================

/// Flat element tree backed by a slot arena.
pub struct MemoryHost {
    nodes: Vec<Option<NodeRecord>>,
    /// Freed slot indices, reused before the arena grows.
    free: Vec<usize>,
    root: ElementId,
}

impl MemoryHost {
    /// Fresh host with only the root container allocated.
    pub fn new() -> Self {
        let mut host = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: ElementId::new(0),
        };
        host.root = host.alloc(NodeRecord::new(NodeKind::Tag, "root"));
        host
    }

    fn alloc(&mut self, record: NodeRecord) -> ElementId {
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(record);
                index
            }
            None => {
                self.nodes.push(Some(record));
                self.nodes.len() - 1
            }
        };
        ElementId::new(index)
    }

    fn record(&self, el: ElementId) -> Option<&NodeRecord> {
        self.nodes.get(el.index()).and_then(|slot| slot.as_ref())
    }

    fn record_mut(&mut self, el: ElementId) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(el.index()).and_then(|slot| slot.as_mut())
    }

    /// Unlink `el` from its current parent, if any.
    fn detach(&mut self, el: ElementId) {
        let Some(parent) = self.record(el).and_then(|record| record.parent) else {
            return;
        };
        if let Some(record) = self.record_mut(parent) {
            record.children.retain(|&child| child != el);
        }
        if let Some(record) = self.record_mut(el) {
            record.parent = None;
        }
    }

    /// Link `el` under `parent`, before `end_mark` or at the end.
    fn insert_child(&mut self, parent: ElementId, el: ElementId, end_mark: Option<ElementId>) {
        self.detach(el);
        if let Some(record) = self.record_mut(parent) {
            let at = match end_mark {
                Some(mark) => {
                    let found = record.children.iter().position(|&child| child == mark);
                    debug_assert!(found.is_some(), "end mark {mark} is not a child of {parent}");
                    found.unwrap_or(record.children.len())
                }
                None => record.children.len(),
            };
            record.children.insert(at, el);
        }
        if let Some(record) = self.record_mut(el) {
            record.parent = Some(parent);
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Whether the slot behind `el` is still allocated.
    pub fn contains(&self, el: ElementId) -> bool {
        self.record(el).is_some()
    }

    /// Node kind, if allocated.
    pub fn kind(&self, el: ElementId) -> Option<NodeKind> {
        self.record(el).map(|record| record.kind)
    }

    /// Tag name or text content, if allocated.
    pub fn label(&self, el: ElementId) -> Option<&str> {
        self.record(el).map(|record| record.label.as_str())
    }

    /// Children of `el` in sibling order; empty for stale handles.
    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.record(el).map(|record| record.children.as_slice()).unwrap_or(&[])
    }

    /// Stored property entry, if set.
    pub fn prop(&self, el: ElementId, name: &str) -> Option<&PropEntry> {
        self.record(el).and_then(|record| record.props.get(name))
    }

    /// Count of currently allocated nodes (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Free a detached subtree, returning every handle that was freed.
    ///
    /// The caller is expected to forward the freed handles to
    /// [`Tracker::evict`](crate::tracker::Tracker::evict) so bookkeeping
    /// does not outlive the nodes. Discarding an attached node is a
    /// contract violation.
    pub fn discard(&mut self, el: ElementId) -> Vec<ElementId> {
        debug_assert!(
            self.record(el).is_none_or(|record| record.parent.is_none()),
            "discarding a node that is still attached"
        );
        let mut freed = Vec::new();
        self.discard_into(el, &mut freed);
        freed
    }

    fn discard_into(&mut self, el: ElementId, freed: &mut Vec<ElementId>) {
        let Some(record) = self.nodes.get_mut(el.index()).and_then(Option::take) else {
            return;
        };
        self.free.push(el.index());
        freed.push(el);
        for child in record.children {
            self.discard_into(child, freed);
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HostApi
// =============================================================================

impl HostApi for MemoryHost {
    fn create(&mut self, markup: Markup) -> Value {
        match markup {
            Markup::Tag(name) => Value::Element(self.alloc(NodeRecord::new(NodeKind::Tag, &name))),
            Markup::Text(content) => {
                Value::Element(self.alloc(NodeRecord::new(NodeKind::Text, &content)))
            }
            Markup::Fragment(children) => {
                let frag = self.alloc(NodeRecord::new(NodeKind::Fragment, ""));
                for child in children {
                    let value = self.create(child);
                    self.attach(frag, value, None);
                }
                Value::Fragment(frag)
            }
        }
    }

    fn attach(&mut self, parent: ElementId, value: Value, end_mark: Option<ElementId>) -> Value {
        match value {
            Value::Element(el) => {
                self.insert_child(parent, el, end_mark);
                Value::Element(el)
            }
            Value::Fragment(frag) => {
                // Consume the fragment: its children move, the husk stays.
                let children: Vec<ElementId> =
                    self.record(frag).map(|record| record.children.clone()).unwrap_or_default();
                for child in children {
                    self.insert_child(parent, child, end_mark);
                }
                Value::Empty
            }
            Value::List(items) => {
                for item in items {
                    self.attach(parent, item, end_mark);
                }
                Value::Empty
            }
            Value::Text(content) => {
                let el = self.alloc(NodeRecord::new(NodeKind::Text, &content));
                self.insert_child(parent, el, end_mark);
                Value::Element(el)
            }
            Value::Empty => Value::Empty,
        }
    }

    fn insert(
        &mut self,
        el: ElementId,
        value: Value,
        end_mark: Option<ElementId>,
        _current: Option<Value>,
    ) -> Value {
        // Replace the content preceding the end mark with the new value.
        let existing: Vec<ElementId> = self
            .children(el)
            .iter()
            .copied()
            .take_while(|&child| Some(child) != end_mark)
            .collect();
        for child in existing {
            self.detach(child);
        }
        self.attach(el, value, end_mark)
    }

    fn set_property(&mut self, el: ElementId, name: &str, value: &str, is_attr: bool, is_css: bool) {
        let mut flags = PropFlags::empty();
        if is_attr {
            flags |= PropFlags::ATTRIBUTE;
        }
        if is_css {
            flags |= PropFlags::CSS;
        }
        if let Some(record) = self.record_mut(el) {
            record.props.insert(
                name.to_string(),
                PropEntry {
                    value: value.to_string(),
                    flags,
                },
            );
        }
    }

    fn remove(&mut self, parent: ElementId, start: ElementId, end_mark: Option<ElementId>) {
        let run: Vec<ElementId> = {
            let Some(record) = self.record(parent) else {
                return;
            };
            let Some(at) = record.children.iter().position(|&child| child == start) else {
                debug_assert!(false, "removal start {start} is not a child of {parent}");
                return;
            };
            debug_assert!(
                end_mark.is_none_or(|mark| record.children[at..].contains(&mark)),
                "end mark does not terminate the sibling run"
            );
            record.children[at..]
                .iter()
                .copied()
                .take_while(|&child| Some(child) != end_mark)
                .collect()
        };
        for el in run {
            self.detach(el);
        }
    }

    fn parent_of(&self, el: ElementId) -> Option<ElementId> {
        self.record(el).and_then(|record| record.parent)
    }

    fn next_sibling(&self, el: ElementId) -> Option<ElementId> {
        let parent = self.parent_of(el)?;
        let record = self.record(parent)?;
        let at = record.children.iter().position(|&child| child == el)?;
        record.children.get(at + 1).copied()
    }

    fn root(&self) -> ElementId {
        self.root
    }
}
