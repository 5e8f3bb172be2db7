//! Tree navigator - folds a quick-xml event stream into a loosely typed tree
//! and gives safe path access into it.
//!
//! Conventions follow the bureau feed's usual consumers:
//! - text is trimmed, and a childless element is a text leaf
//! - attributes are merged in as if they were child elements
//! - text next to child elements is kept under the `_` key
//! - repeated sibling names collapse into a list, a single one stays singular

use crate::ingestion::error::XmlError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Key under which mixed-content text is stored
pub const TEXT_KEY: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Text(String),
    Record(Vec<(String, XmlNode)>),
    List(Vec<XmlNode>),
}

impl XmlNode {
    /// Child lookup. Only records have children.
    pub fn get(&self, key: &str) -> Option<&XmlNode> {
        match self {
            XmlNode::Record(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Dotted path lookup, `None` as soon as any segment is missing
    pub fn path(&self, path: &str) -> Option<&XmlNode> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Text content of a leaf, or of the `_` key of an element carrying attributes
    pub fn text(&self) -> Option<&str> {
        match self {
            XmlNode::Text(s) => Some(s),
            XmlNode::Record(_) => self.get(TEXT_KEY).and_then(XmlNode::text),
            XmlNode::List(_) => None,
        }
    }

    pub fn text_at(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(XmlNode::text)
    }

    /// Singular-or-list normalization: a list yields its items, anything
    /// else yields itself as a one-element sequence
    pub fn as_list(&self) -> Vec<&XmlNode> {
        match self {
            XmlNode::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// An element still waiting for its end tag
struct OpenElement {
    name: String,
    children: Vec<(String, XmlNode)>,
    text: String,
}

impl OpenElement {
    fn start(e: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut element = OpenElement {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            children: Vec::new(),
            text: String::new(),
        };
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.trim().to_string();
            element.children.push((key, XmlNode::Text(value)));
        }
        Ok(element)
    }

    fn close(self) -> (String, XmlNode) {
        let text = self.text.trim();
        if self.children.is_empty() {
            return (self.name, XmlNode::Text(text.to_string()));
        }

        let mut fields: Vec<(String, XmlNode)> = Vec::new();
        for (key, node) in self.children {
            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some((_, XmlNode::List(items))) => items.push(node),
                Some((_, existing)) => {
                    let first = std::mem::replace(existing, XmlNode::List(Vec::new()));
                    *existing = XmlNode::List(vec![first, node]);
                }
                None => fields.push((key, node)),
            }
        }
        if !text.is_empty() {
            fields.push((TEXT_KEY.to_string(), XmlNode::Text(text.to_string())));
        }
        (self.name, XmlNode::Record(fields))
    }
}

/// Parse a document into a record holding its single root element
pub fn parse_document(bytes: &[u8]) -> Result<XmlNode, XmlError> {
    let xml = std::str::from_utf8(bytes)?;
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, XmlNode)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                stack.push(OpenElement::start(&e)?);
            }
            Event::Empty(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                let closed = OpenElement::start(&e)?.close();
                attach(&mut stack, &mut root, closed);
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end names
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element.close());
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if is_blank_outside_root(&text) => {}
                    None => return Err(XmlError::TextOutsideRoot),
                }
            }
            Event::CData(c) => match stack.last_mut() {
                Some(current) => current
                    .text
                    .push_str(&String::from_utf8_lossy(&c.into_inner())),
                None => return Err(XmlError::TextOutsideRoot),
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = stack.pop() {
        return Err(XmlError::Unclosed(unclosed.name));
    }

    root.map(|r| XmlNode::Record(vec![r])).ok_or(XmlError::NoRoot)
}

/// Only whitespace and a byte order mark may surround the root element
fn is_blank_outside_root(text: &str) -> bool {
    text.trim_start_matches('\u{feff}').trim().is_empty()
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<(String, XmlNode)>,
    closed: (String, XmlNode),
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(closed),
        None => *root = Some(closed),
    }
}
