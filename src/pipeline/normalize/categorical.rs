use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::text::TextNormalizer;
use crate::error::Result;

/// One canonical code and the labels that map to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryGroup {
    pub code: String,
    pub labels: Vec<String>,
}

impl CategoryGroup {
    pub fn new(code: &str, labels: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Which `TextNormalizer` variant a mapper applies to its input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    #[default]
    Loose,
    Strict,
}

impl TextMode {
    fn apply(self, raw: &str) -> String {
        if TextNormalizer::is_missing(raw) {
            return String::new();
        }
        match self {
            TextMode::Loose => TextNormalizer::normalize(Some(raw)),
            TextMode::Strict => TextNormalizer::strict(Some(raw)),
        }
    }
}

/// Declarative description of a categorical column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryTable {
    #[serde(default)]
    pub mode: TextMode,
    /// Exact label groups, matched after normalization
    #[serde(default)]
    pub groups: Vec<CategoryGroup>,
    /// Ordered regex groups, searched against the normalized text.
    /// The first group with any matching pattern wins.
    #[serde(default)]
    pub keywords: Vec<CategoryGroup>,
    /// Code returned for empty input
    #[serde(default)]
    pub empty_default: Option<String>,
}

/// How a categorical value was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    Exact(String),
    Keyword(String),
    EmptyDefault(String),
    /// No rule applied; carries the normalized input
    Passthrough(String),
}

impl Mapping {
    pub fn value(&self) -> &str {
        match self {
            Mapping::Exact(v) | Mapping::Keyword(v) | Mapping::EmptyDefault(v) | Mapping::Passthrough(v) => v,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Mapping::Exact(v) | Mapping::Keyword(v) | Mapping::EmptyDefault(v) | Mapping::Passthrough(v) => v,
        }
    }
}

struct KeywordRule {
    code: String,
    patterns: Vec<Regex>,
}

/// Compiled reverse lookup plus ordered keyword classifier
pub struct CategoricalMapper {
    mode: TextMode,
    exact: HashMap<String, String>,
    keywords: Vec<KeywordRule>,
    empty_default: Option<String>,
}

impl CategoricalMapper {
    pub fn new(table: &CategoryTable) -> Result<Self> {
        let mut exact = HashMap::new();
        for group in &table.groups {
            // The code itself is always an accepted spelling
            for label in std::iter::once(&group.code).chain(group.labels.iter()) {
                let key = table.mode.apply(label);
                if key.is_empty() {
                    continue;
                }
                if let Some(existing) = exact.get(&key) {
                    if existing != &group.code {
                        debug!("label '{}' already maps to '{}', ignoring '{}'", key, existing, group.code);
                    }
                    continue;
                }
                exact.insert(key, group.code.clone());
            }
        }

        let keywords = table
            .keywords
            .iter()
            .map(|group| -> Result<KeywordRule> {
                let patterns = group
                    .labels
                    .iter()
                    .map(|p| Regex::new(p))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(KeywordRule {
                    code: group.code.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            mode: table.mode,
            exact,
            keywords,
            empty_default: table.empty_default.clone(),
        })
    }

    /// Resolve a raw cell: exact label, then keywords in declaration order,
    /// then the normalized text itself.
    pub fn lookup(&self, raw: &str) -> Mapping {
        let norm = self.mode.apply(raw);
        if norm.is_empty() {
            return match &self.empty_default {
                Some(code) => Mapping::EmptyDefault(code.clone()),
                None => Mapping::Passthrough(norm),
            };
        }
        if let Some(code) = self.exact.get(&norm) {
            return Mapping::Exact(code.clone());
        }
        if let Some(code) = self.classify(&norm) {
            return Mapping::Keyword(code.to_string());
        }
        Mapping::Passthrough(norm)
    }

    pub fn map(&self, raw: &str) -> String {
        self.lookup(raw).into_value()
    }

    /// First keyword group with a pattern matching the already-normalized text
    pub fn classify(&self, normalized: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| p.is_match(normalized)))
            .map(|rule| rule.code.as_str())
    }
}
