use weave_template::{AttrValue, ParseError, Tag, Tree, join, outline, parse};

fn parts(p: &[&str]) -> String {
    join(p)
}

#[test]
fn parse_element_with_text() {
    let ast = parse("<div>hi</div>").unwrap();
    assert_eq!(ast.len(), 1);
    assert_eq!(ast[0].tag, Tag::Static("div".into()));
    assert_eq!(&*ast[0].children, &[Tree::text("hi")]);
}

#[test]
fn whitespace_only_text_and_comments_are_dropped() {
    let ast = parse("<ul>\n  <!-- items -->\n  <li>a   b</li>\n</ul>").unwrap();
    let ul = &ast[0];
    assert_eq!(ul.children.len(), 1);
    assert_eq!(&*ul.children[0].children, &[Tree::text("a b")]);
}

#[test]
fn slots_are_counted_per_subtree() {
    let src = parts(&["<", " class=", "><p>Hello ", "</p><a href=\"", "\" @click=", ">x</a></>"]);
    let ast = parse(&src).unwrap();
    let root = &ast[0];
    assert_eq!(root.tag, Tag::Dynamic);
    assert_eq!(root.attributes, vec![("class".into(), AttrValue::Dynamic)]);
    assert_eq!(root.slots, 5);
    assert_eq!(root.children[0].slots, 1);
    assert_eq!(root.children[0].children[0], Tree::text("Hello "));
    assert_eq!(root.children[0].children[1], Tree::slot());
    assert_eq!(root.children[1].slots, 2);
    assert_eq!(root.children[1].dynamic_attributes(), 2);
}

#[test]
fn static_attributes_keep_their_values() {
    let ast = parse(r#"<input type="text" value='a &amp; b' disabled/>"#).unwrap();
    assert_eq!(
        ast[0].attributes,
        vec![
            ("type".into(), AttrValue::Static("text".into())),
            ("value".into(), AttrValue::Static("a & b".into())),
            ("disabled".into(), AttrValue::Static(String::new())),
        ]
    );
}

#[test]
fn void_elements_need_no_close() {
    let ast = parse("<p>a<br>b<img src=x></p>").unwrap();
    let p = &ast[0];
    assert_eq!(p.children.len(), 4);
    assert_eq!(p.children[1].tag, Tag::Static("br".into()));
    assert!(p.children[1].children.is_empty());
}

#[test]
fn children_placeholder_is_recognised() {
    let ast = parse("<section><Children/></section>").unwrap();
    assert!(ast[0].children[0].is_children_placeholder());
    assert!(!ast[0].is_children_placeholder());
}

#[test]
fn dynamic_elements_close_with_any_tag() {
    let src = parts(&["<", ">x</anything><", "/>"]);
    let ast = parse(&src).unwrap();
    assert_eq!(ast.len(), 2);
    assert_eq!(ast[0].children[0], Tree::text("x"));
    assert_eq!(ast[1].slots, 1);
}

#[test]
fn partial_attribute_interpolation_is_rejected() {
    let src = parts(&["<p class=\"a ", "\"></p>"]);
    assert_eq!(
        parse(&src).unwrap_err(),
        ParseError::PartialAttribute("class".into())
    );
    let src = parts(&["<p class=a", "></p>"]);
    assert!(matches!(parse(&src), Err(ParseError::PartialAttribute(_))));
}

#[test]
fn mismatched_and_unclosed_tags_fail() {
    assert_eq!(
        parse("<div><span></div>").unwrap_err(),
        ParseError::MismatchedClose {
            expected: "span".into(),
            found: "div".into()
        }
    );
    assert_eq!(parse("<div>").unwrap_err(), ParseError::Unclosed("div".into()));
    assert_eq!(
        parse("</div>").unwrap_err(),
        ParseError::UnexpectedClose("div".into())
    );
}

#[test]
fn outline_numbers_slots_in_walk_order() {
    let src = parts(&["<div title=", ">", "<b>", "</b></div>"]);
    let ast = parse(&src).unwrap();
    assert_eq!(
        outline(&ast),
        "<div title=$0>\n  $1\n  <b>\n    $2\n"
    );
}
