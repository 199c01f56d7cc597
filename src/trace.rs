//! Interception layer - host primitives wrapped with tree maintenance.
//!
//! [`Traced`] decorates a [`HostApi`] value and exposes the same primitive
//! surface. `create_component`, `create`, `attach`, and `remove` run the
//! tracking algorithm around the delegated call; `insert` and
//! `set_property` pass through untouched. Observers that want to see the
//! pass-through calls wrap the host underneath instead (see
//! [`Logged`](crate::logging::Logged)).
//!
//! # Re-entrancy
//!
//! A component factory's body renders its descendants through the same
//! `Traced` value before returning, so every wrapper here must be correct
//! under nesting. The render stack's push/pop discipline guarantees frames
//! unwind in order however deep the recursion goes.

use std::collections::HashSet;

use crate::host::HostApi;
use crate::tracker::{Hooks, Tracker};
use crate::types::{ElementId, Markup, RenderFrame, Value};

// =============================================================================
// Traced
// =============================================================================

/// A host runtime wrapped with component tree tracking.
pub struct Traced<H> {
    host: H,
    tracker: Tracker,
}

impl<H: HostApi> Traced<H> {
    /// Wrap a host runtime. All tracking state starts empty.
    pub fn new(host: H) -> Self {
        Self {
            host,
            tracker: Tracker::new(),
        }
    }

    /// Read access to the wrapped host, for structural queries.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the wrapped host.
    ///
    /// For the host's own lifecycle surface (e.g. discarding detached
    /// nodes). Structural mutations made here happen behind the tracker's
    /// back and are not folded into the component tree.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Read access to the tracked state.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Mutable access to the tracked state, for eviction and reset.
    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    /// The observer hook slots.
    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.tracker.hooks
    }

    /// Unwrap, dropping all tracked state.
    pub fn into_host(self) -> H {
        self.host
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Create element(s) from primitive markup.
    ///
    /// Delegates directly. A fragment result is remembered in the one-slot
    /// stash: the host consumes a fragment's children during the attach
    /// that follows, so its identity has to be captured here, before that
    /// happens.
    pub fn create(&mut self, markup: Markup) -> Value {
        let ret = self.host.create(markup);
        if let Value::Fragment(frag) = ret {
            self.tracker.stashed_fragment = Some(frag);
        }
        ret
    }

    /// Run a component factory and register what it renders.
    ///
    /// `name` is the factory's identity label; `render` is its body, which
    /// receives this wrapper so descendants are tracked too. A non-element
    /// result is returned unchanged with no bookkeeping. An element result
    /// gets a tree entry (it already has one if the body attached
    /// component children into it) and a metadata record, then the create
    /// hook fires.
    pub fn create_component<F>(&mut self, name: &str, render: F) -> Value
    where
        F: FnOnce(&mut Self) -> Value,
    {
        self.tracker.stack.push(RenderFrame::new(name));
        let out = render(self);
        let frame = self.tracker.stack.pop();

        let Some(el) = out.node() else {
            return out;
        };

        if !self.tracker.tree.contains_key(&el) {
            self.tracker.tree.insert(el, HashSet::new());
        }
        let meta = frame.unwrap_or_else(|| RenderFrame::new(name));
        self.tracker.meta.insert(el, meta);
        self.tracker.hooks.fire_create(name, el);
        out
    }

    // =========================================================================
    // Attach
    // =========================================================================

    /// Insert `value` under `parent` and fold it into the component tree.
    ///
    /// The host runs first; the stash then recovers the fragment identity
    /// behind a list value, because the host has already consumed the
    /// fragment's children by this point.
    pub fn attach(&mut self, parent: ElementId, value: Value, end_mark: Option<ElementId>) -> Value {
        let ret = self.host.attach(parent, value.clone(), end_mark);

        let mut value = value;
        if value.is_list() {
            if let Some(frag) = self.tracker.stashed_fragment.take() {
                value = Value::Fragment(frag);
            }
        }
        let Some(el) = value.node() else {
            return ret;
        };
        self.track_attach(parent, el);
        ret
    }

    /// Fold an attached element into the tree.
    ///
    /// Classification, writing `<-` for "receives":
    /// - anything <- untracked element: no action, it carries no components
    /// - tracked <- component: parent's set gains the component
    /// - tracked <- guard: parent's set gains the guard's members, the
    ///   guard entry dies
    /// - untracked detached (or root) <- value: parent becomes a guard
    /// - untracked connected <- value: the nearest tracked ancestor adopts
    ///   the children instead
    fn track_attach(&mut self, parent: ElementId, el: ElementId) {
        if !self.tracker.tree.contains_key(&el) {
            return;
        }
        let el_is_component = self.tracker.meta.contains_key(&el);

        let tree_parent = if self.tracker.tree.contains_key(&parent) {
            if el_is_component {
                if let Some(children) = self.tracker.tree.get_mut(&parent) {
                    children.insert(el);
                }
            } else {
                let hoisted = self.tracker.tree.get(&el).cloned().unwrap_or_default();
                if let Some(children) = self.tracker.tree.get_mut(&parent) {
                    children.extend(hoisted);
                }
            }
            parent
        } else {
            let children: HashSet<ElementId> = if el_is_component {
                HashSet::from([el])
            } else {
                self.tracker.tree.get(&el).cloned().unwrap_or_default()
            };
            if self.host.parent_of(parent).is_none() || parent == self.host.root() {
                self.tracker.tree.insert(parent, children);
                parent
            } else {
                // Value landed in the connected tree: hand the children to
                // the nearest tracked ancestor, or the root as a last resort.
                let adoptive = self.adoptive_parent_of(parent);
                if let Some(existing) = self.tracker.tree.get_mut(&adoptive) {
                    existing.extend(children);
                } else {
                    self.tracker.tree.insert(adoptive, children);
                }
                adoptive
            }
        };

        self.tracker.hooks.fire_attach(tree_parent, el);

        // Delete after the hook fires: the guard handed its children over.
        if !el_is_component {
            self.tracker.tree.remove(&el);
        }
    }

    /// Nearest tracked physical ancestor of `start`, root as fallback.
    fn adoptive_parent_of(&self, start: ElementId) -> ElementId {
        let mut cursor = start;
        while let Some(parent) = self.host.parent_of(cursor) {
            if self.tracker.tree.contains_key(&parent) {
                return parent;
            }
            cursor = parent;
        }
        self.host.root()
    }

    // =========================================================================
    // Remove
    // =========================================================================

    /// Remove the sibling run `[start, end_mark)` under `parent`.
    ///
    /// The tracked parent can differ from the physical parent, so the
    /// ancestor walk runs first, then each visited sibling is dropped from
    /// that parent's set (when present) with a detach event per sibling.
    /// Bookkeeping happens before the host mutates the sibling chain.
    pub fn remove(&mut self, parent: ElementId, start: ElementId, end_mark: Option<ElementId>) {
        let tree_parent = self.adoptive_parent_of(start);
        if self.tracker.tree.contains_key(&tree_parent) {
            let mut cursor = Some(start);
            while let Some(current) = cursor {
                if Some(current) == end_mark {
                    break;
                }
                if let Some(children) = self.tracker.tree.get_mut(&tree_parent) {
                    children.remove(&current);
                }
                self.tracker.hooks.fire_detach(tree_parent, current);
                cursor = self.host.next_sibling(current);
            }
        }
        self.host.remove(parent, start, end_mark);
    }

    // =========================================================================
    // Pass-through
    // =========================================================================

    /// Forwarded to the host unmodified.
    pub fn insert(
        &mut self,
        el: ElementId,
        value: Value,
        end_mark: Option<ElementId>,
        current: Option<Value>,
    ) -> Value {
        self.host.insert(el, value, end_mark, current)
    }

    /// Forwarded to the host unmodified.
    pub fn set_property(&mut self, el: ElementId, name: &str, value: &str, is_attr: bool, is_css: bool) {
        self.host.set_property(el, name, value, is_attr, is_css);
    }
}
