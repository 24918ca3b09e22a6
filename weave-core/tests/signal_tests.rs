use std::cell::RefCell;
use std::rc::Rc;

use weave_core::{Effect, Reactive, Signal, effect};
use weave_dom::{Target, create_element, create_text};

#[test]
fn test_signal_and_effect() {
    let count = Signal::new(0);
    let observed = Rc::new(RefCell::new(0));

    {
        let count = count.clone();
        let observed = observed.clone();
        effect(move || {
            *observed.borrow_mut() = count.get();
        });
    }

    // Initial effect run should have written 0
    assert_eq!(*observed.borrow(), 0);

    count.set(42);
    assert_eq!(*observed.borrow(), 42);
}

#[test]
fn stopped_effect_no_longer_runs() {
    let count = Signal::new(0);
    let runs = Rc::new(RefCell::new(0));
    let handle = {
        let count = count.clone();
        let runs = runs.clone();
        effect(move || {
            count.get();
            *runs.borrow_mut() += 1;
        })
    };
    count.set(1);
    handle.stop();
    count.set(2);
    assert_eq!(*runs.borrow(), 2);
    assert!(!handle.is_active());
}

#[test]
fn subscribed_target_follows_set() {
    let title = Signal::new(String::from("a"));
    let el = create_element("p");
    let unsub = title
        .as_reactive()
        .subscribe(Target::attribute(el.clone(), "title"));
    assert_eq!(title.target_count(), 1);

    title.set("b".into());
    assert_eq!(el.attribute("title").as_deref(), Some("b"));

    unsub.call();
    assert_eq!(title.target_count(), 0);
    title.set("c".into());
    assert_eq!(el.attribute("title").as_deref(), Some("b"));
}

#[test]
fn reactive_snapshot_is_display() {
    let n = Signal::new(3.5);
    assert_eq!(n.as_reactive().snapshot(), "3.5");
    n.update(|v| v * 2.0);
    assert_eq!(n.as_reactive().snapshot(), "7");
}

#[test]
fn clones_share_identity() {
    let a = Signal::new(1);
    let b = a.clone();
    assert!(Signal::ptr_eq(&a, &b));
    assert!(weave_core::same_reactive(&a.as_reactive(), &b.as_reactive()));
    assert!(!weave_core::same_reactive(
        &a.as_reactive(),
        &Signal::new(1).as_reactive()
    ));
}

#[test]
fn derived_effect_recomputes_and_patches_text() {
    let first = Signal::new(String::from("Ada"));
    let last = Signal::new(String::from("Lovelace"));
    let full = {
        let (first, last) = (first.clone(), last.clone());
        Effect::new(move || format!("{} {}", first.get(), last.get()))
    };
    let node = create_text(full.as_reactive().snapshot());
    let _keep = full.as_reactive().subscribe(Target::text(node.clone()));

    assert_eq!(full.get(), "Ada Lovelace");
    last.set("Byron".into());
    assert_eq!(full.get(), "Ada Byron");
    assert_eq!(node.data().as_deref(), Some("Ada Byron"));

    full.stop();
    first.set("Augusta".into());
    assert_eq!(node.data().as_deref(), Some("Ada Byron"));
}

#[test]
fn update_patches_targets_and_runs_effects() {
    let count = Signal::new(1u32);
    let node = create_text("");
    let _unsub = count.as_reactive().subscribe(Target::text(node.clone()));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _handle = effect({
        let count = count.clone();
        let seen = seen.clone();
        move || seen.borrow_mut().push(count.get())
    });

    count.update(|v| v + 1);
    count.update(|v| v * 10);

    assert_eq!(node.data().as_deref(), Some("20"));
    assert_eq!(*seen.borrow(), vec![1, 2, 20]);
}
