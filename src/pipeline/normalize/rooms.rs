use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::text::TextNormalizer;
use crate::error::{NormalizeError, Result};

/// A canonical room code and the spellings it is known by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomAlias {
    pub code: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl RoomAlias {
    pub fn new(code: &str, aliases: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// What to do with a label that matches no room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomPolicy {
    /// Unresolved labels fail the file
    Strict,
    /// Unresolved labels pass through as normalized text
    Permissive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomResolution {
    Known(String),
    Passthrough(String),
}

impl RoomResolution {
    pub fn code(&self) -> &str {
        match self {
            RoomResolution::Known(c) | RoomResolution::Passthrough(c) => c,
        }
    }
}

pub struct RoomAliasResolver {
    /// (code, normalized code + aliases), in declaration order
    entries: Vec<(String, Vec<String>)>,
    policy: RoomPolicy,
    allowed: Option<HashSet<String>>,
}

impl RoomAliasResolver {
    pub fn new(table: &[RoomAlias], policy: RoomPolicy, allowed: Option<&[String]>) -> Self {
        let entries = table
            .iter()
            .map(|room| {
                let names = std::iter::once(&room.code)
                    .chain(room.aliases.iter())
                    .map(|n| TextNormalizer::strict(Some(n)))
                    .collect();
                (room.code.clone(), names)
            })
            .collect();
        Self {
            entries,
            policy,
            allowed: allowed.map(|a| a.iter().cloned().collect()),
        }
    }

    /// First room whose code or any alias equals the strictly normalized label
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let norm = TextNormalizer::strict(Some(raw));
        self.entries
            .iter()
            .find(|(_, names)| names.iter().any(|n| *n == norm))
            .map(|(code, _)| code.as_str())
    }

    pub fn resolve(&self, raw: &str) -> Result<RoomResolution> {
        if let Some(code) = self.lookup(raw) {
            return Ok(RoomResolution::Known(code.to_string()));
        }
        let normalized = TextNormalizer::strict(Some(raw));
        match self.policy {
            RoomPolicy::Strict => Err(NormalizeError::UnresolvedRoom {
                raw: raw.to_string(),
                normalized,
            }),
            RoomPolicy::Permissive => Ok(RoomResolution::Passthrough(normalized)),
        }
    }

    /// Whether a resolved code survives the allow-set; no allow-set keeps everything
    pub fn is_allowed(&self, code: &str) -> bool {
        self.allowed.as_ref().map_or(true, |set| set.contains(code))
    }
}
