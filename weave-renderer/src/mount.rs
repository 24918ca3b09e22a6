use tracing::info;
use weave_dom::Node;

use crate::Component;

/// Render `component` without a children context and append its nodes to
/// `container`. Returns the appended nodes.
pub fn mount(component: &Component, container: &Node) -> Vec<Node> {
    let nodes = component.render(None);
    container.append_all(&nodes);
    info!(nodes = nodes.len(), container = ?container, "mounted component");
    nodes
}
