//! Owned SVG document tree.
//!
//! The drawing is parsed with `quick-xml` into a small mutable tree so layer
//! styles can be rewritten and whole layers removed before the document is
//! written back out. Everything that is not an element (declarations,
//! comments, text, CDATA, doctype) is kept as the original event and
//! re-emitted untouched.

mod layers;
mod prune;

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{LayerexError, Result};

pub use layers::{Layer, LayerDirectory, INKSCAPE_NS, SVG_NS};
pub use prune::prune;

/// Child indices leading from the top level of a document to a node.
pub type NodePath = Vec<usize>;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Any non-element event, kept verbatim.
    Other(Event<'static>),
}

/// An element with its qualified name, attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written, e.g. `g` or `svg:g`.
    pub name: String,
    /// Attributes in source order; values are unescaped.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// Whether the element was written as `<tag/>`.
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Get an attribute by its qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// The name prefix and local part, e.g. `("svg", "g")` for `svg:g`.
    pub fn split_name(&self) -> (Option<&str>, &str) {
        split_qname(&self.name)
    }

    /// Iterate over child elements with their index among all children.
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children.iter().enumerate().filter_map(|(i, n)| match n {
            Node::Element(e) => Some((i, e)),
            Node::Other(_) => None,
        })
    }
}

/// Split a qualified name into prefix and local part.
pub(crate) fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// A parsed SVG drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    nodes: Vec<Node>,
}

fn xml_error(context: &str, e: impl Display) -> LayerexError {
    LayerexError::Document {
        message: format!("{}: {}", context, e),
        help: None,
    }
}

impl SvgDocument {
    /// Load and parse an SVG file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| LayerexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read drawing: {}", e),
        })?;

        Self::parse(&source)
    }

    /// Parse an SVG document from a string.
    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        // Elements still waiting for their end tag.
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        // General entities from the internal DOCTYPE subset.
        let mut entities: HashMap<String, String> = HashMap::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| xml_error("Invalid XML", e))?;

            match event {
                Event::Start(start) => {
                    open.push(element_from_start(&start, false, &entities)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, true, &entities)?;
                    push_node(&mut open, &mut nodes, Node::Element(element));
                }
                Event::End(_) => {
                    // The reader checks that end names match their start tags.
                    let element = open.pop().ok_or_else(|| LayerexError::Document {
                        message: "Unexpected closing tag".to_string(),
                        help: None,
                    })?;
                    push_node(&mut open, &mut nodes, Node::Element(element));
                }
                Event::DocType(doctype) => {
                    declare_entities(&String::from_utf8_lossy(&doctype), &mut entities);
                    let doctype = Node::Other(Event::DocType(doctype.into_owned()));
                    push_node(&mut open, &mut nodes, doctype);
                }
                Event::Eof => break,
                other => push_node(&mut open, &mut nodes, Node::Other(other.into_owned())),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(LayerexError::Document {
                message: format!("Unclosed element <{}>", unclosed.name),
                help: None,
            });
        }

        let document = Self { nodes };
        if document.root().is_none() {
            return Err(LayerexError::Document {
                message: "Document has no root element".to_string(),
                help: Some("Pass an SVG file saved by Inkscape".to_string()),
            });
        }

        Ok(document)
    }

    /// The document (root) element.
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Other(_) => None,
        })
    }

    /// Top-level nodes (prolog, root element, trailing comments).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up the element at `path`.
    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.nodes.get(*first)? {
            Node::Element(e) => e,
            Node::Other(_) => return None,
        };
        for index in rest {
            current = match current.children.get(*index)? {
                Node::Element(e) => e,
                Node::Other(_) => return None,
            };
        }
        Some(current)
    }

    /// Look up the element at `path` for modification.
    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.nodes.get_mut(*first)? {
            Node::Element(e) => e,
            Node::Other(_) => return None,
        };
        for index in rest {
            current = match current.children.get_mut(*index)? {
                Node::Element(e) => e,
                Node::Other(_) => return None,
            };
        }
        Some(current)
    }

    /// Detach the node at `path`, returning it.
    ///
    /// Indices of later siblings shift down by one, so callers removing
    /// several nodes should go from last to first in document order.
    pub fn remove(&mut self, path: &[usize]) -> Option<Node> {
        let (last, parent) = path.split_last()?;
        let siblings = if parent.is_empty() {
            &mut self.nodes
        } else {
            &mut self.element_mut(parent)?.children
        };
        (*last < siblings.len()).then(|| siblings.remove(*last))
    }

    /// Serialize back to SVG text.
    pub fn to_svg_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| xml_error("Invalid UTF-8 output", e))
    }

    /// Serialize and write to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let svg = self.to_svg_string()?;
        std::fs::write(path, svg).map_err(|e| LayerexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write SVG: {}", e),
        })
    }
}

fn push_node(open: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

/// Collect `<!ENTITY name "value">` declarations. Parameter and external
/// entities are skipped; the first declaration of a name wins.
fn declare_entities(doctype: &str, entities: &mut HashMap<String, String>) {
    const DECL: &str = "<!ENTITY";

    let mut rest = doctype;
    while let Some(start) = rest.find(DECL) {
        rest = rest[start + DECL.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(len) = rest[1..].find(quote) else {
            break;
        };

        entities
            .entry(name.to_string())
            .or_insert_with(|| rest[1..1 + len].to_string());
        rest = &rest[len + 2..];
    }
}

fn element_from_start(
    start: &BytesStart<'_>,
    self_closing: bool,
    entities: &HashMap<String, String>,
) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| xml_error("Invalid element name", e))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(&format!("Invalid attribute on <{}>", name), e))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| xml_error("Invalid attribute name", e))?
            .to_string();
        let value = attr
            .unescape_value_with(|entity| {
                resolve_predefined_entity(entity)
                    .or_else(|| entities.get(entity).map(String::as_str))
            })
            .map_err(|e| xml_error(&format!("Invalid value for attribute '{}'", key), e))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        self_closing,
    })
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Other(event) => writer
            .write_event(event.borrow())
            .map_err(|e| xml_error("Failed to write XML", e)),
        Node::Element(element) => {
            let start = BytesStart::new(element.name.as_str()).with_attributes(
                element
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );

            if element.self_closing && element.children.is_empty() {
                return writer
                    .write_event(Event::Empty(start))
                    .map_err(|e| xml_error("Failed to write XML", e));
            }

            writer
                .write_event(Event::Start(start))
                .map_err(|e| xml_error("Failed to write XML", e))?;
            for child in &element.children {
                write_node(writer, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(element.name.as_str())))
                .map_err(|e| xml_error("Failed to write XML", e))
        }
    }
}
