//! Inkscape layer discovery.

use super::{split_qname, Element, Node, NodePath, SvgDocument};

/// The SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// The Inkscape namespace carrying `groupmode` and `label`.
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

/// A layer found in the drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Position of the layer element in the document.
    pub path: NodePath,
    /// The `inkscape:label` attribute, if present.
    pub label: Option<String>,
}

impl Layer {
    /// Check whether this layer's label is one of `labels`.
    pub fn matches<'a>(&self, mut labels: impl Iterator<Item = &'a str>) -> bool {
        match &self.label {
            Some(label) => labels.any(|l| l == label),
            None => false,
        }
    }
}

/// All layers of a document, in document order.
#[derive(Debug, Clone, Default)]
pub struct LayerDirectory {
    layers: Vec<Layer>,
}

/// In-scope namespace bindings: `(prefix, uri)`, innermost last.
/// The default namespace uses an empty prefix.
type Scope<'a> = Vec<(&'a str, &'a str)>;

impl LayerDirectory {
    /// Find every layer in `document`, however deeply nested.
    pub fn discover(document: &SvgDocument) -> Self {
        let mut layers = Vec::new();
        let mut scope: Scope = Vec::new();

        for (index, node) in document.nodes().iter().enumerate() {
            if let Node::Element(element) = node {
                collect(element, vec![index], &mut scope, &mut layers);
            }
        }

        log::debug!("discovered {} layer(s)", layers.len());
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Labels of all labelled layers, in document order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().filter_map(|l| l.label.as_deref())
    }

    /// Check whether any layer carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }
}

impl<'a> IntoIterator for &'a LayerDirectory {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

fn collect<'a>(
    element: &'a Element,
    path: NodePath,
    scope: &mut Scope<'a>,
    layers: &mut Vec<Layer>,
) {
    let bindings_before = scope.len();
    for (key, value) in &element.attributes {
        if key == "xmlns" {
            scope.push(("", value.as_str()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((prefix, value.as_str()));
        }
    }

    if is_layer(element, scope) {
        layers.push(Layer {
            label: attr_ns(element, scope, INKSCAPE_NS, "label").map(str::to_string),
            path: path.clone(),
        });
    }

    for (index, child) in element.child_elements() {
        let mut child_path = path.clone();
        child_path.push(index);
        collect(child, child_path, scope, layers);
    }

    scope.truncate(bindings_before);
}

fn resolve<'a>(scope: &Scope<'a>, prefix: &str) -> Option<&'a str> {
    scope
        .iter()
        .rev()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
        .filter(|uri| !uri.is_empty())
}

fn is_layer(element: &Element, scope: &Scope) -> bool {
    let (prefix, local) = element.split_name();
    local == "g"
        && resolve(scope, prefix.unwrap_or("")) == Some(SVG_NS)
        && attr_ns(element, scope, INKSCAPE_NS, "groupmode") == Some("layer")
}

/// Look up a namespaced attribute. Unprefixed attributes have no namespace.
fn attr_ns<'e>(element: &'e Element, scope: &Scope, ns: &str, local: &str) -> Option<&'e str> {
    element.attributes.iter().find_map(|(key, value)| {
        match split_qname(key) {
            (Some(prefix), name) if name == local && prefix != "xmlns" => {
                (resolve(scope, prefix) == Some(ns)).then_some(value.as_str())
            }
            _ => None,
        }
    })
}
