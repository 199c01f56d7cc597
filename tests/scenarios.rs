//! End-to-end tracking scenarios against the in-memory host.
//!
//! These walk the same call sequences a reactive runtime would issue and
//! check the logical tree that falls out: component registration, guard
//! flattening, adoptive reparenting, and detach symmetry.

use std::cell::RefCell;
use std::rc::Rc;

use sprig_trace::{
    ElementId, HostApi, LogOptions, Markup, MemoryHost, Traced, Value, log_trace,
};

fn traced() -> Traced<MemoryHost> {
    Traced::new(MemoryHost::new())
}

fn component(ui: &mut Traced<MemoryHost>, name: &str, tag: &str) -> ElementId {
    ui.create_component(name, |ui| ui.create(Markup::tag(tag)))
        .node()
        .expect("component should render an element")
}

fn plain(ui: &mut Traced<MemoryHost>, tag: &str) -> ElementId {
    ui.create(Markup::tag(tag)).node().expect("markup should render an element")
}

#[test]
fn test_component_with_no_children() {
    let mut ui = traced();
    let div = component(&mut ui, "Foo", "div");

    assert_eq!(ui.tracker().name_of(div), Some("Foo"));
    assert!(ui.tracker().children_of(div).unwrap().is_empty());
    assert_eq!(ui.tracker().tree().len(), 1);
}

#[test]
fn test_nested_components_register_as_parent_and_child() {
    let mut ui = traced();
    let out = ui.create_component("Outer", |ui| {
        let div = ui.create(Markup::tag("div"));
        let span = ui.create_component("Inner", |ui| ui.create(Markup::tag("span")));
        let div_el = div.node().unwrap();
        ui.attach(div_el, span, None);
        div
    });
    let div = out.node().unwrap();

    assert_eq!(ui.tracker().name_of(div), Some("Outer"));
    assert_eq!(ui.tracker().children_of(div).unwrap().len(), 1);
    let span = *ui.tracker().children_of(div).unwrap().iter().next().unwrap();
    assert_eq!(ui.tracker().name_of(span), Some("Inner"));
    assert!(ui.tracker().children_of(span).unwrap().is_empty());
    assert_eq!(ui.host().children(div), &[span]);
}

#[test]
fn test_plain_list_guards_items_until_adopted() {
    let mut ui = traced();
    let ul = plain(&mut ui, "ul");
    let li1 = component(&mut ui, "Item", "li");
    let li2 = component(&mut ui, "Item", "li");

    ui.attach(ul, Value::Element(li1), None);
    ui.attach(ul, Value::Element(li2), None);

    // The detached list holds its component items in trust.
    let guarded = ui.tracker().children_of(ul).unwrap();
    assert_eq!(guarded.len(), 2);
    assert!(guarded.contains(&li1) && guarded.contains(&li2));

    let div = component(&mut ui, "ListBox", "div");
    ui.attach(div, Value::Element(ul), None);

    // Once the list lands under a component, the items belong to it
    // directly and the list drops out of the logical tree.
    assert!(!ui.tracker().contains(ul));
    let children = ui.tracker().children_of(div).unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.contains(&li1) && children.contains(&li2));

    // Exactly one owner: nothing else claims the items.
    for (owner, children) in ui.tracker().tree() {
        if *owner != div {
            assert!(!children.contains(&li1) && !children.contains(&li2));
        }
    }
}

#[test]
fn test_fragment_recovered_across_create_then_attach() {
    let mut ui = traced();
    let frag = match ui.create(Markup::Fragment(vec![])) {
        Value::Fragment(frag) => frag,
        other => panic!("expected fragment, got {other:?}"),
    };
    let a = component(&mut ui, "Row", "tr");
    let b = component(&mut ui, "Row", "tr");
    ui.attach(frag, Value::Element(a), None);
    ui.attach(frag, Value::Element(b), None);

    let table = plain(&mut ui, "table");
    ui.attach(
        table,
        Value::List(vec![Value::Element(a), Value::Element(b)]),
        None,
    );

    assert!(!ui.tracker().contains(frag));
    let guarded = ui.tracker().children_of(table).unwrap();
    assert!(guarded.contains(&a) && guarded.contains(&b));
    assert_eq!(ui.host().children(table), &[a, b]);
}

#[test]
fn test_adoptive_parent_gains_children_of_untracked_wrapper() {
    let mut ui = traced();
    let panel = component(&mut ui, "Panel", "div");
    let root = ui.host().root();
    ui.attach(root, Value::Element(panel), None);

    let wrapper = plain(&mut ui, "section");
    ui.attach(panel, Value::Element(wrapper), None);

    let item = component(&mut ui, "Item", "span");
    ui.attach(wrapper, Value::Element(item), None);

    // The wrapper never enters the logical tree; its tracked ancestor does
    // the owning.
    assert!(!ui.tracker().contains(wrapper));
    assert!(ui.tracker().children_of(panel).unwrap().contains(&item));
    assert_eq!(ui.host().parent_of(item), Some(wrapper));
}

#[test]
fn test_detach_fires_once_per_visited_sibling() {
    let mut ui = traced();
    let panel = component(&mut ui, "Panel", "div");
    let root = ui.host().root();
    ui.attach(root, Value::Element(panel), None);

    let ul = plain(&mut ui, "ul");
    ui.attach(panel, Value::Element(ul), None);
    let li1 = component(&mut ui, "Item", "li");
    let li2 = component(&mut ui, "Item", "li");
    ui.attach(ul, Value::Element(li1), None);
    ui.attach(ul, Value::Element(li2), None);

    let children = ui.tracker().children_of(panel).unwrap();
    assert!(children.contains(&li1) && children.contains(&li2));

    let events: Rc<RefCell<Vec<(ElementId, ElementId)>>> = Rc::default();
    let seen = events.clone();
    ui.hooks_mut().set_on_detach(Box::new(move |parent, child| {
        seen.borrow_mut().push((parent, child));
    }));

    // Remove only the first item: the walk stops at the end marker.
    ui.remove(ul, li1, Some(li2));

    assert_eq!(events.borrow().as_slice(), &[(panel, li1)]);
    let children = ui.tracker().children_of(panel).unwrap();
    assert!(!children.contains(&li1));
    assert!(children.contains(&li2));
    assert_eq!(ui.host().children(ul), &[li2]);

    // Remove the rest without a marker: the walk runs off the end.
    events.borrow_mut().clear();
    ui.remove(ul, li2, None);

    assert_eq!(events.borrow().as_slice(), &[(panel, li2)]);
    assert!(ui.tracker().children_of(panel).unwrap().is_empty());
    assert!(ui.host().children(ul).is_empty());
}

#[test]
fn test_removed_item_can_be_reowned_elsewhere() {
    let mut ui = traced();
    let root = ui.host().root();
    let left = component(&mut ui, "Pane", "div");
    let right = component(&mut ui, "Pane", "div");
    ui.attach(root, Value::Element(left), None);
    ui.attach(root, Value::Element(right), None);

    let item = component(&mut ui, "Card", "article");
    ui.attach(left, Value::Element(item), None);
    assert!(ui.tracker().children_of(left).unwrap().contains(&item));

    ui.remove(left, item, None);
    ui.attach(right, Value::Element(item), None);

    // Membership moved: exactly one pane owns the card.
    assert!(!ui.tracker().children_of(left).unwrap().contains(&item));
    assert!(ui.tracker().children_of(right).unwrap().contains(&item));
    assert_eq!(ui.host().parent_of(item), Some(right));
}

#[test]
fn test_root_adopts_when_no_tracked_ancestor_exists() {
    let mut ui = traced();
    let root = ui.host().root();
    let wrapper = plain(&mut ui, "main");
    ui.attach(root, Value::Element(wrapper), None);

    let app = component(&mut ui, "App", "div");
    ui.attach(wrapper, Value::Element(app), None);

    assert!(ui.tracker().children_of(root).unwrap().contains(&app));
    assert!(!ui.tracker().contains(wrapper));
}

#[test]
fn test_eviction_follows_host_discard() {
    let mut ui = traced();
    let panel = component(&mut ui, "Panel", "div");
    let root = ui.host().root();
    ui.attach(root, Value::Element(panel), None);
    let item = component(&mut ui, "Item", "span");
    ui.attach(panel, Value::Element(item), None);

    // Tear the item down: physical removal, then host discard, then the
    // discard notification drives tracker eviction.
    ui.remove(panel, item, None);
    let freed = ui.host_mut().discard(item);
    for el in freed {
        ui.tracker_mut().evict(el);
    }

    assert!(!ui.tracker().contains(item));
    assert!(!ui.tracker().is_component(item));
}

#[test]
fn test_logged_stack_tracks_identically() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut ui = log_trace(MemoryHost::new(), LogOptions::default());
    let root = ui.host().root();

    let item = ui
        .create_component("Item", |ui| ui.create(Markup::tag("li")))
        .node()
        .unwrap();
    let panel = ui
        .create_component("Panel", |ui| {
            let div = ui.create(Markup::tag("div"));
            let el = div.node().unwrap();
            ui.attach(el, Value::Element(item), None);
            div
        })
        .node()
        .unwrap();
    ui.attach(root, Value::Element(panel), None);
    ui.set_property(panel, "data-kind", "panel", true, false);

    assert_eq!(ui.tracker().name_of(panel), Some("Panel"));
    assert!(ui.tracker().children_of(panel).unwrap().contains(&item));
    assert!(ui.tracker().children_of(root).unwrap().contains(&panel));
    assert_eq!(
        ui.host().inner().prop(panel, "data-kind").unwrap().value,
        "panel"
    );
}
