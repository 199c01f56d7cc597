//! Logging observer - a thin consumer of the tree hooks.
//!
//! Two independent pieces, composable into one stack:
//!
//! - [`TraceLogger`] chains the three tracker hooks with logging versions.
//!   It keeps its own element -> component-name labels, fed by the create
//!   hook, so attach/detach lines can name what the handles point at. The
//!   tracker itself stays unaware of labels.
//! - [`Logged`] decorates a [`HostApi`] value and logs every primitive
//!   call, including `insert` and `set_property`, which the interception
//!   layer forwards without looking at. Install it underneath the traced
//!   wrapper to see the full primitive traffic.
//!
//! [`log_trace`] wires both together. With both installed, attach events
//! that landed on an adoptive parent (a tracked ancestor rather than the
//! requested physical parent) are annotated as such.
//!
//! Everything here is side-effect only: no hook or wrapper alters tracked
//! state or host behavior.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use crate::host::HostApi;
use crate::trace::Traced;
use crate::types::{ElementId, Markup, Value};

// =============================================================================
// Options
// =============================================================================

/// Formatting options for logged values.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// List items printed before truncating.
    pub max_list_items: usize,
    /// Characters of text printed before truncating.
    pub max_text_len: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            max_list_items: 3,
            max_text_len: 10,
        }
    }
}

// =============================================================================
// Value Formatting
// =============================================================================

/// Render a value for a log line, truncating per the options.
pub fn fmt_value(value: &Value, options: &LogOptions) -> String {
    match value {
        Value::Element(el) => el.to_string(),
        Value::Fragment(el) => format!("fragment{el}"),
        Value::Text(text) => fmt_text(text, options),
        Value::List(items) => {
            let shown: Vec<String> = items
                .iter()
                .take(options.max_list_items)
                .map(|item| fmt_value(item, options))
                .collect();
            if items.len() > options.max_list_items {
                format!(
                    "[{}, ...{} more]",
                    shown.join(", "),
                    items.len() - options.max_list_items
                )
            } else {
                format!("[{}]", shown.join(", "))
            }
        }
        Value::Empty => "()".to_string(),
    }
}

fn fmt_text(text: &str, options: &LogOptions) -> String {
    if text.chars().count() > options.max_text_len {
        let cut: String = text.chars().take(options.max_text_len).collect();
        format!("{cut:?}...")
    } else {
        format!("{text:?}")
    }
}

fn fmt_markup(markup: &Markup, options: &LogOptions) -> String {
    match markup {
        Markup::Tag(name) => format!("<{name}>"),
        Markup::Text(text) => fmt_text(text, options),
        Markup::Fragment(children) => format!("fragment[{}]", children.len()),
    }
}

// =============================================================================
// Hook Logger
// =============================================================================

/// Hook-based tree event logger.
pub struct TraceLogger {
    labels: Rc<RefCell<HashMap<ElementId, String>>>,
}

impl TraceLogger {
    /// Chain logging versions of all three hooks onto `traced`.
    ///
    /// Previously installed hooks keep firing after each log line.
    pub fn install<H: HostApi>(traced: &mut Traced<H>) -> Self {
        Self::install_with(traced, None)
    }

    fn install_with<H: HostApi>(
        traced: &mut Traced<H>,
        requested_parent: Option<Rc<Cell<Option<ElementId>>>>,
    ) -> Self {
        let labels: Rc<RefCell<HashMap<ElementId, String>>> = Rc::default();
        let hooks = traced.hooks_mut();

        let map = labels.clone();
        let mut prev = hooks.set_on_create(Box::new(|_, _| {}));
        hooks.set_on_create(Box::new(move |name, el| {
            map.borrow_mut().insert(el, name.to_string());
            debug!("create: {name} rendered {el}");
            prev(name, el);
        }));

        let map = labels.clone();
        let mut prev = hooks.set_on_attach(Box::new(|_, _| {}));
        hooks.set_on_attach(Box::new(move |parent, child| {
            let adopted = requested_parent
                .as_ref()
                .is_some_and(|cell| cell.get().is_some_and(|requested| requested != parent));
            let line = format!(
                "attach: {} receives {}",
                label(&map, parent),
                label(&map, child)
            );
            if adopted {
                debug!("{line} (adoptive parent)");
            } else {
                debug!("{line}");
            }
            prev(parent, child);
        }));

        let map = labels.clone();
        let mut prev = hooks.set_on_detach(Box::new(|_, _| {}));
        hooks.set_on_detach(Box::new(move |parent, child| {
            debug!("detach: {} unlinks {}", label(&map, parent), label(&map, child));
            prev(parent, child);
        }));

        Self { labels }
    }

    /// The component name recorded for `el`, if the create hook saw it.
    pub fn label_of(&self, el: ElementId) -> Option<String> {
        self.labels.borrow().get(&el).cloned()
    }
}

fn label(map: &Rc<RefCell<HashMap<ElementId, String>>>, el: ElementId) -> String {
    match map.borrow().get(&el) {
        Some(name) => format!("{name}{el}"),
        None => el.to_string(),
    }
}

// =============================================================================
// Host Decorator
// =============================================================================

/// A host runtime that logs every primitive call before delegating.
pub struct Logged<H> {
    inner: H,
    options: LogOptions,
    /// Parent handed to the most recent attach call; lets the hook logger
    /// tell a direct attach from an adoptive one.
    last_attach_parent: Rc<Cell<Option<ElementId>>>,
}

impl<H> Logged<H> {
    /// Wrap a host with call logging.
    pub fn new(inner: H, options: LogOptions) -> Self {
        Self {
            inner,
            options,
            last_attach_parent: Rc::new(Cell::new(None)),
        }
    }

    /// The wrapped host.
    pub fn inner(&self) -> &H {
        &self.inner
    }

    fn attach_parent_cell(&self) -> Rc<Cell<Option<ElementId>>> {
        self.last_attach_parent.clone()
    }
}

impl<H: HostApi> HostApi for Logged<H> {
    fn create(&mut self, markup: Markup) -> Value {
        let shown = fmt_markup(&markup, &self.options);
        let ret = self.inner.create(markup);
        trace!("host create: {shown} -> {}", fmt_value(&ret, &self.options));
        ret
    }

    fn attach(&mut self, parent: ElementId, value: Value, end_mark: Option<ElementId>) -> Value {
        self.last_attach_parent.set(Some(parent));
        trace!(
            "host attach: parent {parent}, value {}",
            fmt_value(&value, &self.options)
        );
        self.inner.attach(parent, value, end_mark)
    }

    fn insert(
        &mut self,
        el: ElementId,
        value: Value,
        end_mark: Option<ElementId>,
        current: Option<Value>,
    ) -> Value {
        trace!("host insert: el {el}, value {}", fmt_value(&value, &self.options));
        self.inner.insert(el, value, end_mark, current)
    }

    fn set_property(&mut self, el: ElementId, name: &str, value: &str, is_attr: bool, is_css: bool) {
        trace!("host property: {el} {name}={value} attr:{is_attr} css:{is_css}");
        self.inner.set_property(el, name, value, is_attr, is_css);
    }

    fn remove(&mut self, parent: ElementId, start: ElementId, end_mark: Option<ElementId>) {
        trace!("host remove: parent {parent}, run [{start}, {end_mark:?})");
        self.inner.remove(parent, start, end_mark);
    }

    fn parent_of(&self, el: ElementId) -> Option<ElementId> {
        self.inner.parent_of(el)
    }

    fn next_sibling(&self, el: ElementId) -> Option<ElementId> {
        self.inner.next_sibling(el)
    }

    fn root(&self) -> ElementId {
        self.inner.root()
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Wrap `host` in a fully logged tracking stack.
///
/// The host is decorated with call logging and the tracker's hooks are
/// chained with event logging, including adoptive-parent annotations.
pub fn log_trace<H: HostApi>(host: H, options: LogOptions) -> Traced<Logged<H>> {
    let logged = Logged::new(host, options);
    let requested_parent = logged.attach_parent_cell();
    let mut traced = Traced::new(logged);
    TraceLogger::install_with(&mut traced, Some(requested_parent));
    traced
}
