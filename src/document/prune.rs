//! Removal of hidden layers.

use crate::error::Result;
use crate::style::Style;
use crate::visibility::Visibility;

use super::{LayerDirectory, SvgDocument};

/// Remove every layer whose `display` is `none`.
///
/// Takes the document by value: callers pass a copy so the live drawing keeps
/// all of its layers for the next artifact. Fails if any layer has no
/// `display` property, which means visibility was never applied to it.
pub fn prune(mut document: SvgDocument) -> Result<SvgDocument> {
    let directory = LayerDirectory::discover(&document);

    let mut hidden = Vec::new();
    for layer in &directory {
        let style = document
            .element(&layer.path)
            .and_then(|e| e.attr("style"))
            .map(Style::parse)
            .unwrap_or_default();

        if style.get("display")? == Visibility::Hidden.display_value() {
            hidden.push(layer.path.clone());
        }
    }

    // Last first, so earlier paths stay valid. Nested layers come after their
    // parent in document order and are therefore removed before it.
    for path in hidden.iter().rev() {
        document.remove(path);
    }

    log::debug!("pruned {} of {} layer(s)", hidden.len(), directory.len());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayerexError;
    use crate::style::StyleError;
    use insta::assert_snapshot;

    const HEADER: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">"#;

    fn doc(body: &str) -> SvgDocument {
        SvgDocument::parse(&format!("{}{}</svg>", HEADER, body)).unwrap()
    }

    fn remaining_labels(document: &SvgDocument) -> Vec<String> {
        LayerDirectory::discover(document)
            .labels()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_prune_keeps_visible_in_order() {
        let document = doc(concat!(
            r#"<g inkscape:groupmode="layer" inkscape:label="A" style="display:inline"/>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="B" style="display:none"/>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="C" style="fill:red;display:inline"/>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="D" style="display:none"/>"#,
        ));

        let pruned = prune(document).unwrap();
        assert_eq!(remaining_labels(&pruned), vec!["A", "C"]);
    }

    #[test]
    fn test_prune_leaves_other_content_alone() {
        let document = doc(concat!(
            r#"<title>t</title>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="A" style="display:none"><rect/></g>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="B" style="display:inline"><circle/></g>"#,
        ));

        let pruned = prune(document).unwrap();
        assert_snapshot!(
            pruned.to_svg_string().unwrap(),
            @r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"><title>t</title><g inkscape:groupmode="layer" inkscape:label="B" style="display:inline"><circle/></g></svg>"#
        );
    }

    #[test]
    fn test_prune_nested_hidden_parent_removes_children() {
        let document = doc(concat!(
            r#"<g inkscape:groupmode="layer" inkscape:label="Outer" style="display:none">"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="Inner" style="display:inline"/>"#,
            r#"</g>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="Other" style="display:inline"/>"#,
        ));

        let pruned = prune(document).unwrap();
        assert_eq!(remaining_labels(&pruned), vec!["Other"]);
    }

    #[test]
    fn test_prune_nested_hidden_child() {
        let document = doc(concat!(
            r#"<g inkscape:groupmode="layer" inkscape:label="Outer" style="display:inline">"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="Inner" style="display:none"/>"#,
            r#"<g inkscape:groupmode="layer" inkscape:label="Kept" style="display:inline"/>"#,
            r#"</g>"#,
        ));

        let pruned = prune(document).unwrap();
        assert_eq!(remaining_labels(&pruned), vec!["Outer", "Kept"]);
    }

    #[test]
    fn test_prune_missing_display_is_an_error() {
        let document = doc(r#"<g inkscape:groupmode="layer" inkscape:label="A" style="fill:red"/>"#);

        match prune(document) {
            Err(LayerexError::Style(StyleError::PropertyNotFound(name))) => {
                assert_eq!(name, "display");
            }
            other => panic!("expected a style error, got {other:?}"),
        }
    }

    #[test]
    fn test_prune_missing_style_attribute_is_an_error() {
        let document = doc(r#"<g inkscape:groupmode="layer" inkscape:label="A"/>"#);
        assert!(prune(document).is_err());
    }
}
