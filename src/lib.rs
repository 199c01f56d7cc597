//! # sprig-trace
//!
//! Component tree tracing for reactive UI runtimes.
//!
//! A host UI runtime keeps only a flat tree of rendered elements: it can
//! create elements, attach a value under a parent, and remove a sibling
//! run, but it never records which elements came out of which component
//! invocation, or which component logically contains which once plain
//! wrapper elements sit in between. sprig-trace overlays that logical
//! "component tree" by decorating the host's primitive calls and inferring
//! the relationships from the mutations alone - including hoisting
//! children past non-component wrappers and surviving removal of
//! arbitrary sibling ranges.
//!
//! ## Architecture
//!
//! ```text
//! primitive call → Traced<H> → Tracker (stack / tree / meta) → hooks → HostApi
//! ```
//!
//! [`Traced`] wraps any [`HostApi`] implementation. Each intercepted call
//! updates the [`Tracker`], fires the matching [`Hooks`] slot, and
//! delegates to the host; `insert` and `set_property` pass through
//! untouched. Observers such as the [`logging`] module react to hook
//! events without taking part in the algorithm.
//!
//! ## Example
//!
//! ```ignore
//! use sprig_trace::{Markup, MemoryHost, Traced, Value};
//!
//! let mut ui = Traced::new(MemoryHost::new());
//!
//! let item = ui.create_component("Item", |ui| ui.create(Markup::tag("li")));
//! let panel = ui.create_component("Panel", |ui| {
//!     let div = ui.create(Markup::tag("div"));
//!     let el = div.node().unwrap();
//!     ui.attach(el, item.clone(), None);
//!     div
//! });
//!
//! let panel_el = panel.node().unwrap();
//! assert_eq!(ui.tracker().name_of(panel_el), Some("Panel"));
//! assert_eq!(ui.tracker().children_of(panel_el).unwrap().len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`types`] - element handles, values, markup, render frames
//! - [`tracker`] - tracked state: render stack, component tree, metadata, hooks
//! - [`trace`] - the interception layer wrapping a host runtime
//! - [`host`] - the host collaborator contract and an in-memory reference host
//! - [`logging`] - hook-driven event logging and a call-logging host decorator

pub mod host;
pub mod logging;
pub mod trace;
pub mod tracker;
pub mod types;

// Re-export commonly used items
pub use types::{ElementId, Markup, RenderFrame, Value};

pub use host::{HostApi, MemoryHost, NodeKind, PropEntry, PropFlags};

pub use trace::Traced;

pub use tracker::{AttachHook, CreateHook, DetachHook, Hooks, Tracker};

pub use logging::{LogOptions, Logged, TraceLogger, fmt_value, log_trace};
