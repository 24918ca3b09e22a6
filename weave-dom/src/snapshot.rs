use crate::Node;

/// Detached copy of a node tree that compares by value.
///
/// Anchors appear as empty text; [`Snapshot::visible`] drops them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Snapshot>,
    },
    Text(String),
}

/// Element snapshot with attributes in the given order.
pub fn h(tag: &str, attributes: &[(&str, &str)], children: Vec<Snapshot>) -> Snapshot {
    Snapshot::Element {
        tag: tag.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

pub fn text(t: impl Into<String>) -> Snapshot {
    Snapshot::Text(t.into())
}

impl Snapshot {
    /// The same tree without empty text nodes.
    pub fn visible(&self) -> Option<Snapshot> {
        match self {
            Snapshot::Text(t) if t.is_empty() => None,
            Snapshot::Text(_) => Some(self.clone()),
            Snapshot::Element {
                tag,
                attributes,
                children,
            } => Some(Snapshot::Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                children: children.iter().filter_map(Snapshot::visible).collect(),
            }),
        }
    }
}

impl Node {
    pub fn snapshot(&self) -> Snapshot {
        self.with_kind(
            |tag, attributes, children| Snapshot::Element {
                tag: tag.to_string(),
                attributes: attributes.to_vec(),
                children: children.iter().map(Node::snapshot).collect(),
            },
            |t| Snapshot::Text(t.to_string()),
        )
    }

    /// Build a detached live tree from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Node {
        match snapshot {
            Snapshot::Text(t) => crate::create_text(t.as_str()),
            Snapshot::Element {
                tag,
                attributes,
                children,
            } => {
                let el = crate::create_element(tag.as_str());
                for (k, v) in attributes {
                    el.set_attribute(k, v);
                }
                for c in children {
                    el.append(&Node::from_snapshot(c));
                }
                el
            }
        }
    }
}
