use std::cell::RefCell;
use std::rc::Rc;

use weave_dom::{Target, create_anchor, create_element, create_text, handler};

#[test]
fn append_moves_between_parents() {
    let a = create_element("div");
    let b = create_element("div");
    let span = create_element("span");
    a.append(&span);
    b.append(&span);
    assert_eq!(a.child_count(), 0);
    assert_eq!(b.children(), vec![span.clone()]);
    assert_eq!(span.parent(), Some(b));
}

#[test]
fn insert_after_keeps_order() {
    let ul = create_element("ul");
    let anchor = create_anchor();
    let tail = create_text("tail");
    ul.append(&anchor);
    ul.append(&tail);

    let x = create_element("li");
    let y = create_element("li");
    assert!(anchor.insert_after(&[x.clone(), y.clone()]));
    assert_eq!(ul.children(), vec![anchor, x, y, tail]);
}

#[test]
fn insert_next_to_detached_node_fails() {
    let lone = create_anchor();
    let x = create_text("x");
    assert!(!lone.insert_after(&[x.clone()]));
    assert!(x.parent().is_none());
}

#[test]
fn remove_detaches_and_is_idempotent() {
    let div = create_element("div");
    let t = create_text("x");
    div.append(&t);
    t.remove();
    t.remove();
    assert_eq!(div.child_count(), 0);
    assert!(t.parent().is_none());
}

#[test]
fn classes_are_deduplicated() {
    let div = create_element("div");
    div.set_attribute("class", "card");
    div.add_class("weave-1");
    div.add_class("weave-1");
    assert_eq!(div.attribute("class").as_deref(), Some("card weave-1"));
    div.remove_class("card");
    div.remove_class("weave-1");
    assert_eq!(div.attribute("class"), None);
}

#[test]
fn listeners_fire_and_detach_by_id() {
    let button = create_element("button");
    let clicks = Rc::new(RefCell::new(0));
    let c = clicks.clone();
    let id = button.add_event_listener("click", handler(move |_| *c.borrow_mut() += 1));

    assert_eq!(button.dispatch_event("click"), 1);
    assert_eq!(button.dispatch_event("hover"), 0);
    assert!(button.remove_event_listener(id));
    assert!(!button.remove_event_listener(id));
    assert_eq!(button.dispatch_event("click"), 0);
    assert_eq!(*clicks.borrow(), 1);
}

#[test]
fn retag_keeps_everything_else() {
    let parent = create_element("section");
    let el = create_element("h1");
    el.set_attribute("id", "title");
    el.append(&create_text("hi"));
    parent.append(&el);

    assert!(el.retag("h2"));
    assert_eq!(parent.to_html(), "<section><h2 id=\"title\">hi</h2></section>");
    assert!(!create_text("t").retag("p"));
}

#[test]
fn targets_write_their_role() {
    let el = create_element("p");
    Target::attribute(el.clone(), "title").apply("hello");
    Target::text(el.clone()).apply("body");
    Target::tag_name(el.clone()).apply("span");
    assert_eq!(el.to_html(), "<span title=\"hello\">body</span>");

    let t = create_text("old");
    Target::text(t.clone()).apply("new");
    assert_eq!(t.data().as_deref(), Some("new"));
}
