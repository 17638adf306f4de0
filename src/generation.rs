//! The merged list of artifacts to generate.

use indexmap::{IndexMap, IndexSet};

use crate::config::{Config, LabelMap};

/// Artifact name to the set of labels it shows, in generation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSpec {
    artifacts: IndexMap<String, IndexSet<String>>,
    collisions: Vec<String>,
}

impl GenerationSpec {
    /// Merge grouped and standalone artifacts.
    ///
    /// Grouped artifacts show their own labels followed by `always_include`.
    /// Standalone artifacts are copied as-is and replace a grouped artifact of
    /// the same name, which keeps the grouped artifact's position.
    pub fn build(generate: &LabelMap, standalone: &LabelMap, always_include: &[String]) -> Self {
        let mut artifacts: IndexMap<String, IndexSet<String>> = generate
            .iter()
            .map(|(name, labels)| {
                let set: IndexSet<String> = labels.iter().chain(always_include).cloned().collect();
                (name.clone(), set)
            })
            .collect();

        let mut collisions = Vec::new();
        for (name, labels) in standalone {
            let previous = artifacts.insert(name.clone(), labels.iter().cloned().collect());
            if previous.is_some() {
                log::debug!("standalone artifact '{}' replaces the grouped one", name);
                collisions.push(name.clone());
            }
        }

        Self {
            artifacts,
            collisions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::build(
            &config.generate,
            &config.generate_standalone,
            &config.always_include,
        )
    }

    /// Artifacts in generation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.artifacts.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&IndexSet<String>> {
        self.artifacts.get(name)
    }

    /// Names defined both as grouped and standalone artifacts.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &[&str])]) -> LabelMap {
        entries
            .iter()
            .map(|(name, labels)| {
                (
                    name.to_string(),
                    labels.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect()
    }

    fn labels(spec: &GenerationSpec, name: &str) -> Vec<String> {
        spec.get(name).unwrap().iter().cloned().collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_grouped_union_with_always_include() {
        let spec = GenerationSpec::build(
            &map(&[("step1", &["Base", "Note"]), ("step2", &["Detail"])]),
            &LabelMap::new(),
            &strings(&["Note", "Frame"]),
        );

        assert_eq!(labels(&spec, "step1"), vec!["Base", "Note", "Frame"]);
        assert_eq!(labels(&spec, "step2"), vec!["Detail", "Note", "Frame"]);
    }

    #[test]
    fn test_standalone_verbatim() {
        let spec = GenerationSpec::build(
            &LabelMap::new(),
            &map(&[("cover", &["Title"])]),
            &strings(&["Frame"]),
        );
        assert_eq!(labels(&spec, "cover"), vec!["Title"]);
        assert!(spec.collisions().is_empty());
    }

    #[test]
    fn test_standalone_wins_on_collision() {
        let spec = GenerationSpec::build(
            &map(&[("a", &["Base"]), ("b", &["Detail"])]),
            &map(&[("a", &["Other"]), ("c", &["Title"])]),
            &strings(&["Frame"]),
        );

        assert_eq!(labels(&spec, "a"), vec!["Other"]);
        assert_eq!(spec.collisions(), &["a".to_string()]);

        let order: Vec<&str> = spec.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_config() {
        let config = Config::parse(
            r#"{
                "generate": {"step1": ["Base"]},
                "always-include": ["Note"],
                "generate-standalone": {"step2": ["Detail"]}
            }"#,
        )
        .unwrap();

        let spec = GenerationSpec::from_config(&config);
        assert_eq!(spec.len(), 2);
        assert_eq!(labels(&spec, "step1"), vec!["Base", "Note"]);
        assert_eq!(labels(&spec, "step2"), vec!["Detail"]);
    }

    #[test]
    fn test_empty() {
        let spec = GenerationSpec::build(&LabelMap::new(), &LabelMap::new(), &[]);
        assert!(spec.is_empty());
    }
}
