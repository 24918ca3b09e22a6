use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weave_dom::{Node, create_element};
use weave_renderer::{Arg, BindingKind, Component, RenderError, Signal, mount};

fn error_counter(c: Component) -> (Component, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    let n = count.clone();
    (c.on_error(move |_| n.set(n.get() + 1)), count)
}

#[test]
fn identical_args_change_nothing() {
    let s = Signal::new(1);
    let c = Component::new(&["<p title=", ">", "</p>"], vec![Arg::from(&s), Arg::from("x")]);
    let nodes = c.render(None);
    let before = nodes[0].to_html();

    assert!(c.update(vec![Arg::from(&s), Arg::from("x")]).is_empty());
    assert_eq!(nodes[0].to_html(), before);
    assert_eq!(s.target_count(), 1);
}

#[test]
fn reactive_attribute_patches_only_that_attribute() {
    let title = Signal::new(String::from("a"));
    let c = Component::new(
        &["<div><p title=", " class=\"k\">x</p><span>y</span></div>"],
        vec![Arg::from(&title)],
    );
    let container = create_element("main");
    mount(&c, &container);
    let p = container.first_child().and_then(|d| d.first_child()).unwrap();

    title.set("b".to_string());
    assert_eq!(p.attribute("title").as_deref(), Some("b"));
    assert_eq!(
        container.inner_html(),
        "<div><p title=\"b\" class=\"k\">x</p><span>y</span></div>"
    );
}

#[test]
fn swapping_signals_moves_the_subscription() {
    let a = Signal::new(1);
    let b = Signal::new(10);
    let c = Component::new(&["<p>", "</p>"], vec![Arg::from(&a)]);
    let nodes = c.render(None);

    assert_eq!(c.update(vec![Arg::from(&b)]), vec![0]);
    assert_eq!(nodes[0].text_content(), "10");
    assert_eq!(a.target_count(), 0);
    assert_eq!(b.target_count(), 1);
    assert_eq!(c.subscription_count(), 1);

    a.set(2);
    assert_eq!(nodes[0].text_content(), "10");
    b.set(11);
    assert_eq!(nodes[0].text_content(), "11");
}

#[test]
fn text_slot_is_patched_in_place() {
    let c = Component::new(&["<p>Count: ", "</p>"], vec![Arg::from(1)]);
    let nodes = c.render(None);
    let text = nodes[0].children()[1].clone();

    assert_eq!(c.update(vec![Arg::from(2)]), vec![0]);
    assert_eq!(c.html(), "<p>Count: 2</p>");
    assert!(Node::ptr_eq(&text, &nodes[0].children()[1]));
}

#[test]
fn literal_to_reactive_subscribes_the_recorded_root() {
    let s = Signal::new(5);
    let c = Component::new(&["<p>", "</p>"], vec![Arg::from("plain")]);
    c.render(None);
    c.update(vec![Arg::from(&s)]);
    assert_eq!(c.html(), "<p>5</p>");
    s.set(6);
    assert_eq!(c.html(), "<p>6</p>");

    c.update(vec![Arg::from("plain again")]);
    assert_eq!(s.target_count(), 0);
    assert_eq!(c.html(), "<p>plain again</p>");
}

#[test]
fn tag_name_change_retags_the_element() {
    let c = Component::new(&["<", " class=\"x\">hi</>"], vec![Arg::from("p")]);
    let nodes = c.render(None);
    c.update(vec![Arg::from("section")]);
    assert_eq!(nodes[0].tag_name().as_deref(), Some("section"));
    assert_eq!(c.html(), "<section class=\"x\">hi</section>");
}

#[test]
fn new_handler_replaces_the_old_listener() {
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let (f, s) = (first.clone(), second.clone());
    let c = Component::new(
        &["<button @click=", ">go</button>"],
        vec![Arg::handler(move |_| f.set(f.get() + 1))],
    );
    let button = c.render(None)[0].clone();
    button.dispatch_event("click");

    c.update(vec![Arg::handler(move |_| s.set(s.get() + 1))]);
    assert_eq!(button.listener_count("click"), 1);
    button.dispatch_event("click");
    assert_eq!((first.get(), second.get()), (1, 1));
}

#[test]
fn handler_to_component_detaches_the_listener() {
    let clicks = Rc::new(Cell::new(0));
    let k = clicks.clone();
    let c = Component::new(
        &["<div><button @click=", ">go</button></div>"],
        vec![Arg::handler(move |_| k.set(k.get() + 1))],
    );
    let container = create_element("main");
    mount(&c, &container);
    let button = container.first_child().and_then(|d| d.first_child()).unwrap();

    let badge = Component::new(&["<em>new</em>"], vec![]);
    c.update(vec![Arg::from(&badge)]);
    assert_eq!(button.listener_count("click"), 0);
    assert_eq!(button.dispatch_event("click"), 0);
    assert_eq!(clicks.get(), 0);
    assert_eq!(c.bindings(), vec![Some(BindingKind::Component)]);
    assert_eq!(container.inner_html(), "<div><button>go</button><em>new</em></div>");
}

#[test]
fn text_to_component_renders_after_an_anchor() {
    let c = Component::new(&["<p>", "</p>"], vec![Arg::from("text")]);
    let container = create_element("main");
    mount(&c, &container);

    let inner = Component::new(&["<b>", "</b>"], vec![Arg::from("bold")]);
    assert_eq!(c.update(vec![Arg::from(&inner)]), vec![0]);
    assert_eq!(container.inner_html(), "<p><b>bold</b></p>");

    c.update(vec![Arg::from("text")]);
    assert!(inner.is_disposed());
    assert_eq!(container.inner_html(), "<p>text</p>");
}

#[test]
fn same_template_component_is_updated_not_replaced() {
    let child = Component::new(&["<b>", "</b>"], vec![Arg::from("one")]);
    let parent = Component::new(&["<div>", "</div>"], vec![Arg::from(&child)]);
    let container = create_element("main");
    mount(&parent, &container);

    let next = Component::new(&["<b>", "</b>"], vec![Arg::from("two")]);
    parent.update(vec![Arg::from(&next)]);
    assert!(!child.is_disposed());
    assert!(!next.is_rendered());
    assert_eq!(container.inner_html(), "<div><b>two</b></div>");
}

#[test]
fn different_template_component_is_replaced() {
    let disposed = Rc::new(Cell::new(0));
    let d = disposed.clone();
    let old = Component::new(&["<b>old</b>"], vec![]).on_dispose(move || d.set(d.get() + 1));
    let parent = Component::new(&["<div>", "</div>"], vec![Arg::from(&old)]);
    let container = create_element("main");
    mount(&parent, &container);

    let new = Component::new(&["<i>new</i>"], vec![]);
    parent.update(vec![Arg::from(&new)]);
    assert_eq!(disposed.get(), 1);
    assert!(new.is_rendered());
    assert_eq!(container.inner_html(), "<div><i>new</i></div>");
}

fn item(label: &str, disposed: &Rc<Cell<u32>>) -> Component {
    let d = disposed.clone();
    Component::new(&["<li>", "</li>"], vec![Arg::from(label)]).on_dispose(move || d.set(d.get() + 1))
}

#[test]
fn shrinking_a_list_disposes_exactly_the_tail() {
    let disposed = Rc::new(Cell::new(0));
    let items: Vec<Component> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|l| item(l, &disposed))
        .collect();
    let list = Component::new(&["<ul>", "</ul>"], vec![Arg::from(items.clone())]);
    let container = create_element("main");
    mount(&list, &container);
    let first_li = items[0].root().unwrap()[0].clone();

    list.update(vec![Arg::from(items[..2].to_vec())]);
    assert_eq!(disposed.get(), 3);
    assert!(items[2..].iter().all(Component::is_disposed));
    assert!(items[..2].iter().all(|c| !c.is_disposed()));
    assert!(Node::ptr_eq(&first_li, &items[0].root().unwrap()[0]));
    assert_eq!(container.inner_html(), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn list_reconciliation_keeps_matching_instances() {
    let disposed = Rc::new(Cell::new(0));
    let old = vec![item("a", &disposed), item("b", &disposed), item("c", &disposed)];
    let list = Component::new(&["<ul>", "</ul>"], vec![Arg::from(old.clone())]);
    let container = create_element("main");
    mount(&list, &container);

    let fresh = vec![item("x", &disposed), item("y", &disposed)];
    list.update(vec![Arg::from(fresh.clone())]);
    assert_eq!(disposed.get(), 1);
    assert!(fresh.iter().all(|c| !c.is_rendered()));
    assert_eq!(container.inner_html(), "<ul><li>x</li><li>y</li></ul>");
}

#[test]
fn growing_a_list_renders_new_tail_in_order() {
    let disposed = Rc::new(Cell::new(0));
    let a = item("a", &disposed);
    let list = Component::new(&["<ul>", "<li>end</li></ul>"], vec![Arg::from(vec![a.clone()])]);
    let container = create_element("main");
    mount(&list, &container);

    let b = item("b", &disposed);
    let c = item("c", &disposed);
    list.update(vec![Arg::from(vec![a, b.clone(), c])]);
    assert!(b.is_rendered());
    assert_eq!(disposed.get(), 0);
    assert_eq!(
        container.inner_html(),
        "<ul><li>a</li><li>b</li><li>c</li><li>end</li></ul>"
    );
}

#[test]
fn mixed_component_list_is_a_classification_error() {
    let disposed = Rc::new(Cell::new(0));
    let list = Component::new(&["<ul>", "</ul>"], vec![Arg::from(vec![item("a", &disposed)])]);
    let (list, errors) = error_counter(list);
    list.render(None);

    let mixed = Arg::from(vec![Arg::from(item("b", &disposed)), Arg::from("oops")]);
    assert!(list.update(vec![mixed]).is_empty());
    assert_eq!(errors.get(), 1);
}

#[test]
fn argument_count_mismatch_is_reported() {
    let (c, errors) = error_counter(Component::new(&["<p>", "</p>"], vec![Arg::from(1)]));
    c.render(None);
    assert!(c.update(vec![]).is_empty());
    assert!(c.update(vec![Arg::from(1), Arg::from(2)]).is_empty());
    assert_eq!(errors.get(), 2);
}

#[test]
fn unclassifiable_transition_is_reported() {
    let seen = Rc::new(Cell::new(false));
    let s = seen.clone();
    let c = Component::new(&["<p>", "</p>"], vec![Arg::from("text")]).on_error(move |e| {
        s.set(matches!(
            e.downcast_ref::<RenderError>(),
            Some(RenderError::Classification(_))
        ));
    });
    c.render(None);
    assert!(c.update(vec![Arg::handler(|_| {})]).is_empty());
    assert!(seen.get());
    assert_eq!(c.html(), "<p>text</p>");
}

#[test]
fn update_before_render_only_stores_args() {
    let c = Component::new(&["<p>", "</p>"], vec![Arg::from("a")]);
    assert_eq!(c.update(vec![Arg::from("b")]), vec![0]);
    c.render(None);
    assert_eq!(c.html(), "<p>b</p>");
}

fn logged(markup: &str, order: &Rc<RefCell<Vec<String>>>) -> Component {
    let order = order.clone();
    let name = markup.to_string();
    Component::new(&[markup], vec![]).on_mount(move || order.borrow_mut().push(name.clone()))
}

#[test]
fn changed_component_slots_render_last_slot_first() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let app = Component::new(
        &["<div><", "/><", "/></div>"],
        vec![Arg::from(logged("<i>a</i>", &order)), Arg::from(logged("<u>b</u>", &order))],
    );
    let root = create_element("body");
    mount(&app, &root);
    order.borrow_mut().clear();

    let changed = app.update(vec![
        Arg::from(logged("<i>a2</i>", &order)),
        Arg::from(logged("<u>b2</u>", &order)),
    ]);
    assert_eq!(changed, vec![0, 1]);
    assert_eq!(*order.borrow(), vec!["<u>b2</u>", "<i>a2</i>"]);
    assert_eq!(root.inner_html(), "<div><i>a2</i><u>b2</u></div>");
}

#[test]
fn later_slot_projected_by_a_replaced_host_lands_in_the_new_host() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let app = Component::new(
        &["<main><", "><", "/></></main>"],
        vec![
            Arg::from(logged("<section><Children/></section>", &order)),
            Arg::from(logged("<em>a</em>", &order)),
        ],
    );
    let root = create_element("body");
    mount(&app, &root);
    assert_eq!(root.inner_html(), "<main><section><em>a</em></section></main>");
    order.borrow_mut().clear();

    app.update(vec![
        Arg::from(logged("<article><Children/></article>", &order)),
        Arg::from(logged("<strong>b</strong>", &order)),
    ]);
    assert_eq!(
        root.inner_html(),
        "<main><article><strong>b</strong></article></main>"
    );
    assert_eq!(
        *order.borrow(),
        vec!["<strong>b</strong>", "<article><Children/></article>"]
    );
}
