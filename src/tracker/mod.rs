//! Tracker - render stack, component tree, and metadata bookkeeping.
//!
//! All tracked state for one host runtime instance lives in a single
//! [`Tracker`] value, owned by the interception layer. Multiple host
//! instances get independent trackers; there is no process-wide state.
//!
//! # Note about the tree
//!
//! Every connection between a component and its component children is kept
//! in `tree`. Elements that are not components but currently hold component
//! descendants must also be in the tree (as "guards") so those descendants
//! can be re-parented to a real component ancestor once the guard itself is
//! attached. Every component is in the tree, even with no children, and
//! set members are always component elements - never plain wrappers.

pub mod hooks;

pub use hooks::{AttachHook, CreateHook, DetachHook, Hooks};

use std::collections::{HashMap, HashSet};

use crate::types::{ElementId, RenderFrame};

// =============================================================================
// Tracker
// =============================================================================

/// Tracked state for one host runtime instance.
#[derive(Default)]
pub struct Tracker {
    /// In-progress component renders, innermost last.
    pub(crate) stack: Vec<RenderFrame>,
    /// Element -> component elements it structurally contains.
    pub(crate) tree: HashMap<ElementId, HashSet<ElementId>>,
    /// Component element -> identity of the factory that produced it.
    pub(crate) meta: HashMap<ElementId, RenderFrame>,
    /// Fragment handle carried from a create call to the attach that
    /// consumes it. One slot: a later fragment create overwrites it.
    pub(crate) stashed_fragment: Option<ElementId>,
    /// Observer hook slots.
    pub(crate) hooks: Hooks,
}

impl Tracker {
    /// Fresh tracker with empty state and no-op hooks.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// The render stack, outermost render first.
    pub fn stack(&self) -> &[RenderFrame] {
        &self.stack
    }

    /// The component tree: element -> contained component elements.
    pub fn tree(&self) -> &HashMap<ElementId, HashSet<ElementId>> {
        &self.tree
    }

    /// Component metadata: element -> producing factory's frame.
    pub fn meta(&self) -> &HashMap<ElementId, RenderFrame> {
        &self.meta
    }

    /// Whether the element has a tree entry (component or guard).
    pub fn contains(&self, el: ElementId) -> bool {
        self.tree.contains_key(&el)
    }

    /// Whether the element was produced by a component factory.
    pub fn is_component(&self, el: ElementId) -> bool {
        self.meta.contains_key(&el)
    }

    /// The component elements structurally contained by `el`, if tracked.
    pub fn children_of(&self, el: ElementId) -> Option<&HashSet<ElementId>> {
        self.tree.get(&el)
    }

    /// Identity label of the factory that produced `el`, if a component.
    pub fn name_of(&self, el: ElementId) -> Option<&str> {
        self.meta.get(&el).map(|frame| frame.name.as_str())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Drop every trace of a discarded element.
    ///
    /// The host owns element lifetimes; when it frees a node it reports the
    /// handle here so bookkeeping does not outlive the element. Removes the
    /// element's own tree and meta entries, its stash slot if pending, and
    /// its membership in any surviving child-set.
    pub fn evict(&mut self, el: ElementId) {
        self.tree.remove(&el);
        self.meta.remove(&el);
        if self.stashed_fragment == Some(el) {
            self.stashed_fragment = None;
        }
        for children in self.tree.values_mut() {
            children.remove(&el);
        }
    }

    /// Clear all tracked state, keeping installed hooks.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.tree.clear();
        self.meta.clear();
        self.stashed_fragment = None;
    }
}
