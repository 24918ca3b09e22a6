use weave_style::css;

#[test]
fn layout_and_comments_do_not_change_the_key() {
    let a = css("div { color: red; margin: 0 }");
    let b = css("div{color:red;margin:0}");
    let c = css("/* card */\ndiv {\n  color: red;\n  margin: 0\n}\n");
    assert_eq!(a.key(), b.key());
    assert_eq!(a.key(), c.key());
    assert_ne!(a, b, "sources differ even though keys match");
}

#[test]
fn different_rules_get_different_keys() {
    let a = css("div { color: red }");
    let b = css("div { color: blue }");
    let c = css("span { color: red }");
    assert_ne!(a.key(), b.key());
    assert_ne!(a.key(), c.key());
}

#[test]
fn block_boundaries_matter() {
    let a = css("a { b: c } d { }");
    let b = css("a { b: c d { } }");
    assert_ne!(a.key(), b.key());
}

#[test]
fn marker_keeps_its_source() {
    let s = css("button { margin-left: calc(300px - 85px) }");
    assert!(s.source().contains("calc"));
    assert_eq!(s.to_string(), s.key());
}
