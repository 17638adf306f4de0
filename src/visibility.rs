//! Per-artifact layer visibility.
//!
//! A [`VisibilitySnapshot`] records, for every layer in a [`LayerDirectory`],
//! whether it should be shown. Snapshots are built fresh for each artifact
//! and only written into the document by [`VisibilitySnapshot::apply`], so
//! nothing computed for one artifact can carry over to the next.

use crate::document::{LayerDirectory, SvgDocument};
use crate::error::{LayerexError, Result};
use crate::style::Style;

/// The style property holding layer visibility.
pub const DISPLAY: &str = "display";

/// Whether a layer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    /// The CSS `display` value for this visibility.
    pub fn display_value(self) -> &'static str {
        match self {
            Visibility::Hidden => "none",
            Visibility::Visible => "inline",
        }
    }
}

/// Resolved visibility for every layer, indexed like the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilitySnapshot {
    states: Vec<Visibility>,
}

impl VisibilitySnapshot {
    /// Start with every layer hidden.
    ///
    /// This is the only constructor, so a snapshot can never inherit state
    /// from a previous artifact.
    pub fn reset_all(directory: &LayerDirectory) -> Self {
        Self {
            states: vec![Visibility::Hidden; directory.len()],
        }
    }

    /// Mark every layer labelled with one of `labels` as visible.
    ///
    /// Never hides anything. Returns the labels that matched no layer.
    pub fn show<'a, I>(&mut self, directory: &LayerDirectory, labels: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut unmatched = Vec::new();

        for label in labels {
            let mut found = false;
            for (state, layer) in self.states.iter_mut().zip(directory) {
                if layer.label.as_deref() == Some(label) {
                    *state = Visibility::Visible;
                    found = true;
                }
            }
            if !found {
                log::debug!("no layer labelled '{}'", label);
                unmatched.push(label);
            }
        }

        unmatched
    }

    /// Reset, then show `labels`.
    pub fn resolve<'a, I>(directory: &LayerDirectory, labels: I) -> (Self, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut snapshot = Self::reset_all(directory);
        let unmatched = snapshot.show(directory, labels);
        (snapshot, unmatched)
    }

    /// Visibility of the layer at `index` in the directory.
    pub fn get(&self, index: usize) -> Option<Visibility> {
        self.states.get(index).copied()
    }

    /// Labels of the layers this snapshot shows, in document order.
    pub fn visible_labels<'d>(&self, directory: &'d LayerDirectory) -> Vec<&'d str> {
        self.states
            .iter()
            .zip(directory)
            .filter(|(state, _)| **state == Visibility::Visible)
            .filter_map(|(_, layer)| layer.label.as_deref())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == Visibility::Visible)
            .count()
    }

    /// Write `display` into the style of every layer in `document`.
    ///
    /// Layers without a style attribute get one. `directory` must have been
    /// discovered from `document`.
    pub fn apply(&self, document: &mut SvgDocument, directory: &LayerDirectory) -> Result<()> {
        if self.states.len() != directory.len() {
            return Err(LayerexError::Document {
                message: format!(
                    "visibility covers {} layer(s) but the drawing has {}",
                    self.states.len(),
                    directory.len()
                ),
                help: None,
            });
        }

        for (state, layer) in self.states.iter().zip(directory) {
            let element = document.element_mut(&layer.path).ok_or_else(|| {
                LayerexError::Document {
                    message: format!("layer {:?} is no longer in the drawing", layer.label),
                    help: None,
                }
            })?;

            let mut style = element.attr("style").map(Style::parse).unwrap_or_default();
            style.set(DISPLAY, state.display_value());
            element.set_attr("style", style.to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::get_property;
    use pretty_assertions::assert_eq;

    const DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
<g inkscape:groupmode="layer" inkscape:label="Base" style="display:inline;opacity:1"/>
<g inkscape:groupmode="layer" inkscape:label="Detail"/>
<g inkscape:groupmode="layer" inkscape:label="Note" style="fill:red"/>
<g inkscape:groupmode="layer" inkscape:label="Detail" style="display:inline"/>
</svg>"#;

    fn setup() -> (SvgDocument, LayerDirectory) {
        let document = SvgDocument::parse(DRAWING).unwrap();
        let directory = LayerDirectory::discover(&document);
        (document, directory)
    }

    fn display_values(document: &SvgDocument, directory: &LayerDirectory) -> Vec<String> {
        directory
            .iter()
            .map(|layer| {
                let style = document.element(&layer.path).unwrap().attr("style").unwrap();
                get_property(style, DISPLAY).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_reset_hides_everything() {
        let (_, directory) = setup();
        let snapshot = VisibilitySnapshot::reset_all(&directory);
        assert_eq!(snapshot.visible_count(), 0);
        assert_eq!(snapshot.get(0), Some(Visibility::Hidden));
        assert_eq!(snapshot.get(4), None);
    }

    #[test]
    fn test_show_marks_all_matching_layers() {
        let (_, directory) = setup();
        let (snapshot, unmatched) = VisibilitySnapshot::resolve(&directory, ["Detail"]);
        assert!(unmatched.is_empty());
        assert_eq!(snapshot.visible_labels(&directory), vec!["Detail", "Detail"]);
    }

    #[test]
    fn test_show_reports_unknown_labels() {
        let (_, directory) = setup();
        let (snapshot, unmatched) = VisibilitySnapshot::resolve(&directory, ["Base", "Ghost"]);
        assert_eq!(unmatched, vec!["Ghost"]);
        assert_eq!(snapshot.visible_labels(&directory), vec!["Base"]);
    }

    #[test]
    fn test_apply_writes_display_everywhere() {
        let (mut document, directory) = setup();
        let (snapshot, _) = VisibilitySnapshot::resolve(&directory, ["Note"]);
        snapshot.apply(&mut document, &directory).unwrap();

        assert_eq!(
            display_values(&document, &directory),
            vec!["none", "none", "inline", "none"]
        );
        // Other properties survive.
        let base = document.element(&directory.layers()[0].path).unwrap();
        assert_eq!(base.attr("style"), Some("display:none;opacity:1"));
        let note = document.element(&directory.layers()[2].path).unwrap();
        assert_eq!(note.attr("style"), Some("fill:red;display:inline"));
    }

    #[test]
    fn test_consecutive_artifacts_do_not_leak() {
        let (mut document, directory) = setup();

        let (first, _) = VisibilitySnapshot::resolve(&directory, ["Base", "Note"]);
        first.apply(&mut document, &directory).unwrap();

        let (second, _) = VisibilitySnapshot::resolve(&directory, ["Detail"]);
        second.apply(&mut document, &directory).unwrap();

        assert_eq!(
            display_values(&document, &directory),
            vec!["none", "inline", "none", "inline"]
        );
    }

    #[test]
    fn test_repeated_apply_does_not_grow_style() {
        let (mut document, directory) = setup();
        for labels in [["Base"], ["Note"], ["Base"]] {
            let (snapshot, _) = VisibilitySnapshot::resolve(&directory, labels);
            snapshot.apply(&mut document, &directory).unwrap();
        }
        let base = document.element(&directory.layers()[0].path).unwrap();
        assert_eq!(base.attr("style"), Some("display:inline;opacity:1"));
    }

    #[test]
    fn test_apply_rejects_foreign_directory() {
        let (mut document, directory) = setup();
        let other = SvgDocument::parse("<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
        let snapshot = VisibilitySnapshot::reset_all(&LayerDirectory::discover(&other));
        assert!(snapshot.apply(&mut document, &directory).is_err());
    }
}
