//! Inline CSS style strings.
//!
//! Layers keep their visibility inside the `style` attribute, e.g.
//! `fill:none;display:inline;opacity:1`. [`Style`] parses such a string once
//! into an ordered list of properties and writes it back deterministically.

use std::fmt;

use thiserror::Error;

/// Errors raised when reading a style property.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("property '{0}' not found in style")]
    PropertyNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Property { name: String, value: String },
    /// A segment with no colon, re-emitted as-is.
    Raw(String),
}

/// An ordered set of `name:value` style properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    entries: Vec<Entry>,
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a semicolon-delimited style string.
    ///
    /// Never fails: empty segments are dropped and segments without a colon
    /// are kept verbatim.
    pub fn parse(source: &str) -> Self {
        let entries = source
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once(':') {
                Some((name, value)) => Entry::Property {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                },
                None => Entry::Raw(segment.to_string()),
            })
            .collect();

        Self { entries }
    }

    /// Get the value of the first property called `name`.
    pub fn get(&self, name: &str) -> Result<&str, StyleError> {
        self.properties()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| StyleError::PropertyNotFound(name.to_string()))
    }

    /// Insert or replace a property.
    ///
    /// The first occurrence keeps its position; later duplicates of the same
    /// name are removed so the property appears exactly once.
    pub fn set(&mut self, name: &str, value: &str) {
        let mut seen = false;
        self.entries.retain_mut(|entry| match entry {
            Entry::Property { name: n, value: v } if n.as_str() == name => {
                if seen {
                    return false;
                }
                seen = true;
                *v = value.to_string();
                true
            }
            _ => true,
        });

        if !seen {
            self.entries.push(Entry::Property {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Check whether a property is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Iterate over well-formed properties in order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Property { name, value } => Some((name.as_str(), value.as_str())),
            Entry::Raw(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            match entry {
                Entry::Property { name, value } => write!(f, "{}:{}", name, value)?,
                Entry::Raw(raw) => f.write_str(raw)?,
            }
        }
        Ok(())
    }
}

/// Read one property straight from a style string.
pub fn get_property(style: &str, name: &str) -> Result<String, StyleError> {
    Style::parse(style).get(name).map(str::to_string)
}

/// Upsert one property in a style string, returning the new string.
pub fn set_property(style: &str, name: &str, value: &str) -> String {
    let mut parsed = Style::parse(style);
    parsed.set(name, value);
    parsed.to_string()
}
