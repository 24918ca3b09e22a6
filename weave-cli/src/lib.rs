use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, warn};
use weave_dom::HtmlOptions;
use weave_renderer::{Arg, Component};
use weave_template::{Tree, join, outline, parse};

/// Split template source at `${...}` interpolations. The text between them
/// becomes the template parts; the expressions themselves are discarded.
pub fn split_slots(source: &str) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut rest = source;
    while let Some(start) = rest.find("${") {
        parts.push(rest[..start].to_string());
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| anyhow!("unterminated `${{` at byte {}", source.len() - rest.len() + start))?;
        rest = &after[end + 1..];
    }
    parts.push(rest.to_string());
    Ok(parts)
}

/// Read a template file and split it into parts.
pub fn load(input: &Path) -> Result<Vec<String>> {
    let src =
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let parts = split_slots(&src).with_context(|| format!("in {}", input.display()))?;
    debug!("{}: {} slots", input.display(), parts.len() - 1);
    Ok(parts)
}

fn parse_parts(parts: &[String], input: &Path) -> Result<Rc<[Tree]>> {
    parse(&join(parts)).with_context(|| format!("failed to parse {}", input.display()))
}

/// The parsed tree of a template file, one node per line with slot indices.
pub fn inspect_cmd(input: &Path) -> Result<String> {
    let parts = load(input)?;
    let trees = parse_parts(&parts, input)?;
    Ok(outline(&trees))
}

/// Render a template file with literal arguments and return its HTML.
pub fn render_cmd(input: &Path, args: &[String], show_anchors: bool) -> Result<String> {
    let parts = load(input)?;
    let trees = parse_parts(&parts, input)?;
    let slots: usize = trees.iter().map(|t| t.slots).sum();
    if args.len() < slots {
        bail!(
            "{} has {slots} slots but only {} arguments were given",
            input.display(),
            args.len()
        );
    }
    if args.len() > slots {
        warn!("ignoring {} extra arguments", args.len() - slots);
    }

    let failure: Rc<RefCell<Option<String>>> = Rc::default();
    let sink = failure.clone();
    let component = Component::from_tree(trees, args[..slots].iter().map(Arg::from).collect())
        .on_error(move |e| *sink.borrow_mut() = Some(e.to_string()));
    component.render(None);
    if let Some(err) = failure.borrow_mut().take() {
        bail!("failed to render {}: {err}", input.display());
    }
    Ok(component.html_with(HtmlOptions {
        mark_anchors: show_anchors,
    }))
}
