//! Host runtime collaborator contract.
//!
//! The tracker never renders anything itself. It decorates a host runtime
//! that maintains a flat tree of rendered elements and exposes a small
//! primitive surface: create element(s), attach a value under a parent,
//! remove a contiguous sibling run, plus two pass-through operations the
//! tracker forwards untouched. The flat-tree queries at the bottom of the
//! trait are what the tracking algorithm walks when it has to find an
//! adoptive parent or a sibling run.
//!
//! [`MemoryHost`] is the executable form of this contract, used by the
//! crate's own tests and as a starting point for embedders.

pub mod memory;

pub use memory::{MemoryHost, NodeKind, PropEntry, PropFlags};

use crate::types::{ElementId, Markup, Value};

/// Primitive surface of a flat-tree UI runtime.
pub trait HostApi {
    /// Create element(s) from primitive markup.
    ///
    /// Tags and text yield a single element; fragment markup yields a
    /// fragment whose children are built as siblings.
    fn create(&mut self, markup: Markup) -> Value;

    /// Insert `value` under `parent`, before `end_mark` (append when
    /// `None`). Fragments are consumed: their children move under
    /// `parent` and the fragment itself is left empty. Fragments are
    /// never returned from this call.
    fn attach(&mut self, parent: ElementId, value: Value, end_mark: Option<ElementId>) -> Value;

    /// Replace the rendered content of `el` preceding `end_mark` with
    /// `value`. Not part of tree tracking; forwarded unmodified.
    fn insert(
        &mut self,
        el: ElementId,
        value: Value,
        end_mark: Option<ElementId>,
        current: Option<Value>,
    ) -> Value;

    /// Set a property, attribute, or style entry on an element. Not part
    /// of tree tracking; forwarded unmodified.
    fn set_property(&mut self, el: ElementId, name: &str, value: &str, is_attr: bool, is_css: bool);

    /// Remove the contiguous sibling run `[start, end_mark)` under
    /// `parent`. `None` removes through the end of the run. The range
    /// must be a valid sibling chain under `parent`; anything else is a
    /// contract violation with undefined results.
    fn remove(&mut self, parent: ElementId, start: ElementId, end_mark: Option<ElementId>);

    /// Physical parent of `el`; `None` when detached or `el` is the root.
    fn parent_of(&self, el: ElementId) -> Option<ElementId>;

    /// Next physical sibling of `el` under its current parent.
    fn next_sibling(&self, el: ElementId) -> Option<ElementId>;

    /// The body-like root container every connected element descends from.
    fn root(&self) -> ElementId;
}
