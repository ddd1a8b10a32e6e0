//! Generic decoded form of the metadata service's XML responses.
//!
//! Elements become maps keyed by child tag, repeated tags collapse into lists,
//! and leaf elements become text (or null when empty). Lookups never fail:
//! each helper returns `None` when the shape does not match, so callers can
//! skip malformed fragments without nesting conditionals.
use anyhow::{anyhow, Context, Result};
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Key holding element text when an element also has children.
pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaNode {
    Null,
    Text(String),
    List(Vec<MetaNode>),
    Map(BTreeMap<String, MetaNode>),
}

impl MetaNode {
    /// Child lookup on a map node.
    pub fn get(&self, key: &str) -> Option<&MetaNode> {
        match self {
            MetaNode::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaNode::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text of a direct child, if the child is a leaf.
    pub fn text_at(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaNode::as_text)
    }

    /// View a node that may be either one record or a sequence of records.
    ///
    /// Lists yield their elements, null yields nothing, and any other node is
    /// treated as a one-element sequence.
    pub fn as_items(&self) -> &[MetaNode] {
        match self {
            MetaNode::List(items) => items,
            MetaNode::Null => &[],
            other => std::slice::from_ref(other),
        }
    }
}

/// A parsed response.
///
/// `children` keeps the root's direct children in document order, which the
/// decoded `root` map cannot express across different tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDocument {
    pub root_tag: String,
    pub root: MetaNode,
    pub children: Vec<(String, MetaNode)>,
}

impl MetaDocument {
    /// Direct text of the root element, whether it is a leaf or carries children.
    pub fn root_text(&self) -> Option<&str> {
        match &self.root {
            MetaNode::Text(text) => Some(text),
            node => node.text_at(TEXT_KEY),
        }
    }

    /// Text of each leaf child of the root, in document order.
    pub fn child_texts(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|(_, node)| node.as_text().map(str::to_string))
            .collect()
    }

    /// Tag-to-text view of the root's leaf children; later duplicates win and
    /// empty elements map to an empty string.
    pub fn leaf_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for (tag, node) in &self.children {
            match node {
                MetaNode::Text(text) => {
                    fields.insert(tag.clone(), text.clone());
                }
                MetaNode::Null => {
                    fields.insert(tag.clone(), String::new());
                }
                _ => {}
            }
        }
        fields
    }
}

struct Frame {
    tag: String,
    text: String,
    children: Vec<(String, MetaNode)>,
}

impl Frame {
    fn new(tag: String) -> Self {
        Self {
            tag,
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn build(&self) -> MetaNode {
        let text = self.text.trim();
        if self.children.is_empty() {
            return if text.is_empty() {
                MetaNode::Null
            } else {
                MetaNode::Text(text.to_string())
            };
        }
        let mut map: BTreeMap<String, MetaNode> = BTreeMap::new();
        for (tag, child) in &self.children {
            // Element children are never lists themselves, so any list found
            // here was created by tag repetition.
            match map.remove(tag) {
                None => {
                    map.insert(tag.clone(), child.clone());
                }
                Some(MetaNode::List(mut items)) => {
                    items.push(child.clone());
                    map.insert(tag.clone(), MetaNode::List(items));
                }
                Some(previous) => {
                    map.insert(tag.clone(), MetaNode::List(vec![previous, child.clone()]));
                }
            }
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), MetaNode::Text(text.to_string()));
        }
        MetaNode::Map(map)
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Decode an XML response into a [`MetaDocument`].
///
/// Attributes, comments and processing instructions are ignored.
pub fn parse_document(xml: &str) -> Result<MetaDocument> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut document: Option<MetaDocument> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("parse XML at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                stack.push(Frame::new(tag_name(start.local_name().as_ref())));
            }
            Event::Empty(start) => {
                let tag = tag_name(start.local_name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push((tag, MetaNode::Null)),
                    None if document.is_none() => {
                        document = Some(MetaDocument {
                            root_tag: tag,
                            root: MetaNode::Null,
                            children: Vec::new(),
                        });
                    }
                    None => return Err(anyhow!("XML has more than one root element")),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&text).into_owned();
                    let decoded = unescape(&raw).context("decode XML text")?;
                    frame.text.push_str(&decoded);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(frame) = stack.last_mut() {
                    let entity = format!("&{};", String::from_utf8_lossy(&reference));
                    let decoded = unescape(&entity).context("decode XML entity")?;
                    frame.text.push_str(&decoded);
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| anyhow!("unbalanced XML end tag"))?;
                let node = frame.build();
                match stack.last_mut() {
                    Some(parent) => parent.children.push((frame.tag, node)),
                    None if document.is_none() => {
                        document = Some(MetaDocument {
                            root_tag: frame.tag,
                            root: node,
                            children: frame.children,
                        });
                    }
                    None => return Err(anyhow!("XML has more than one root element")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(anyhow!("unclosed XML element <{}>", open.tag));
    }
    document.ok_or_else(|| anyhow!("XML document has no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tags_become_lists_in_order() {
        let doc = parse_document(
            "<parameters><id>matrix</id><id>database</id><id>gapopen</id></parameters>",
        )
        .expect("parse");
        assert_eq!(doc.root_tag, "parameters");
        assert_eq!(doc.child_texts(), vec!["matrix", "database", "gapopen"]);
        let ids = doc.root.get("id").expect("id list");
        assert_eq!(ids.as_items().len(), 3);
    }

    #[test]
    fn single_child_is_viewed_as_one_item() {
        let doc = parse_document("<values><value><value>x</value></value></values>")
            .expect("parse");
        let entries = doc.root.get("value").expect("value").as_items();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text_at("value"), Some("x"));
    }

    #[test]
    fn leaf_text_is_trimmed_and_unescaped() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?>\n<description>\n  A &amp; B &lt;fast&gt;\n</description>",
        )
        .expect("parse");
        assert_eq!(doc.root_text(), Some("A & B <fast>"));
    }

    #[test]
    fn entities_between_text_runs_are_decoded() {
        let doc = parse_document("<name>Gap&#10;open &amp;&#x20;extend&quot;</name>")
            .expect("parse");
        assert_eq!(doc.root_text(), Some("Gap\nopen & extend\""));
    }

    #[test]
    fn empty_elements_decode_to_null() {
        let doc = parse_document("<parameter><name>x</name><type/><label></label></parameter>")
            .expect("parse");
        assert_eq!(doc.root.get("type"), Some(&MetaNode::Null));
        assert_eq!(doc.root.get("label"), Some(&MetaNode::Null));
        let fields = doc.leaf_fields();
        assert_eq!(fields.get("name").map(String::as_str), Some("x"));
        assert_eq!(fields.get("type").map(String::as_str), Some(""));
    }

    #[test]
    fn lookups_on_mismatched_shapes_return_none() {
        let node = MetaNode::Text("leaf".to_string());
        assert!(node.get("values").is_none());
        assert!(MetaNode::Null.as_text().is_none());
        assert!(MetaNode::Null.as_items().is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_document("<parameter><name>x</parameter>").is_err());
        assert!(parse_document("").is_err());
        assert!(parse_document("<a>1</a><b>2</b>").is_err());
    }
}
