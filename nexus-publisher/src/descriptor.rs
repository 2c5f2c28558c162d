//! Parsing pom.xml text into a tree of named nodes.
//!
//! Only element names and text matter for coordinate resolution, so the tree
//! keeps exactly that: every element becomes a [`DescriptorNode`] holding its
//! trimmed text and its child elements in document order. Attributes,
//! comments and processing instructions are dropped. Namespace prefixes are
//! stripped so `<pom:groupId>` and `<groupId>` read the same.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{AppError, AppResult};

/// One element of a parsed descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorNode {
    pub name: String,
    pub text: String,
    pub children: Vec<DescriptorNode>,
}

impl DescriptorNode {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&DescriptorNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Trimmed text of the first child with the given name; empty text counts
    /// as absent.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

/// Parse descriptor text and return its root element.
pub fn parse(xml: &str) -> AppResult<DescriptorNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<DescriptorNode> = Vec::new();
    let mut root: Option<DescriptorNode> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            AppError::MalformedDescriptor(format!(
                "XML error at position {}: {e}",
                reader.error_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                ensure_single_root(&root)?;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(DescriptorNode::new(name));
            }
            Event::Empty(e) => {
                ensure_single_root(&root)?;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                attach(&mut stack, &mut root, DescriptorNode::new(name));
            }
            Event::End(_) => {
                // quick-xml has already checked that the end tag matches.
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| AppError::MalformedDescriptor(format!("XML unescape error: {e}")))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(AppError::MalformedDescriptor(format!(
            "Unexpected end of document inside <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| AppError::MalformedDescriptor("Document has no root element".to_string()))
}

fn ensure_single_root(root: &Option<DescriptorNode>) -> AppResult<()> {
    match root {
        Some(existing) => Err(AppError::MalformedDescriptor(format!(
            "Content after root element <{}>",
            existing.name
        ))),
        None => Ok(()),
    }
}

fn attach(stack: &mut [DescriptorNode], root: &mut Option<DescriptorNode>, node: DescriptorNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn append_text(stack: &mut [DescriptorNode], text: &str) -> AppResult<()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None => Err(AppError::MalformedDescriptor(
            "Text outside of the root element".to_string(),
        )),
    }
}
