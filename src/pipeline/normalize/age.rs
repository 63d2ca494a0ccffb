use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_AGE_GROUP;
use crate::types::TeamType;

/// Inclusive age range and its label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeBand {
    pub min: i64,
    pub max: i64,
    pub label: String,
}

impl AgeBand {
    pub fn new(min: i64, max: i64, label: &str) -> Self {
        Self {
            min,
            max,
            label: label.to_string(),
        }
    }
}

/// Age group assumed for rooms that are age-restricted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomAgeHint {
    pub rooms: Vec<String>,
    pub group: String,
}

/// Fills unknown age groups from the resolved room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeFill {
    #[serde(default)]
    pub room_hints: Vec<RoomAgeHint>,
    /// Group used when the room gives no signal
    pub default_group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeRules {
    /// Ordered, non-overlapping bands
    pub bands: Vec<AgeBand>,
    /// Label for ages above the highest band
    pub top_label: String,
    #[serde(default)]
    pub fill: Option<AgeFill>,
}

/// Team type of rooms that are not listed as kids or adult rooms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OtherRooms {
    Unknown,
    /// Decided by the age group, like conditional rooms
    ByAge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamRules {
    #[serde(default)]
    pub kids_rooms: Vec<String>,
    #[serde(default)]
    pub adult_rooms: Vec<String>,
    /// Kids when the age group is young, adults otherwise
    #[serde(default)]
    pub conditional_rooms: Vec<String>,
    pub young_groups: Vec<String>,
    pub other_rooms: OtherRooms,
}

pub struct AgeClassifier {
    rules: AgeRules,
    teams: TeamRules,
}

impl AgeClassifier {
    pub fn new(rules: AgeRules, teams: TeamRules) -> Self {
        Self { rules, teams }
    }

    /// Integer age from a cell; fractional values are truncated
    pub fn parse_age(raw: &str) -> Option<i64> {
        let raw = raw.trim();
        raw.parse::<i64>().ok().or_else(|| {
            raw.replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        })
    }

    pub fn age_group(&self, age: i64) -> String {
        if let Some(band) = self.rules.bands.iter().find(|b| (b.min..=b.max).contains(&age)) {
            return band.label.clone();
        }
        let highest = self.rules.bands.iter().map(|b| b.max).max().unwrap_or(i64::MIN);
        if age > highest {
            self.rules.top_label.clone()
        } else {
            UNKNOWN_AGE_GROUP.to_string()
        }
    }

    pub fn categorize(&self, raw: &str) -> String {
        match Self::parse_age(raw) {
            Some(age) => self.age_group(age),
            None => UNKNOWN_AGE_GROUP.to_string(),
        }
    }

    /// Replace an unknown group using the room, when the venue enables it
    pub fn fill_from_room(&self, group: String, room: &str) -> String {
        if group != UNKNOWN_AGE_GROUP {
            return group;
        }
        let Some(fill) = &self.rules.fill else {
            return group;
        };
        fill.room_hints
            .iter()
            .find(|hint| hint.rooms.iter().any(|r| r == room))
            .map(|hint| hint.group.clone())
            .unwrap_or_else(|| fill.default_group.clone())
    }

    pub fn team_type(&self, room: &str, group: &str) -> TeamType {
        let listed = |rooms: &[String]| rooms.iter().any(|r| r == room);
        let by_age = || {
            if self.teams.young_groups.iter().any(|g| g == group) {
                TeamType::Kids
            } else {
                TeamType::Adults
            }
        };

        if listed(self.teams.kids_rooms.as_slice()) {
            TeamType::Kids
        } else if listed(self.teams.adult_rooms.as_slice()) {
            TeamType::Adults
        } else if listed(self.teams.conditional_rooms.as_slice()) {
            by_age()
        } else {
            match self.teams.other_rooms {
                OtherRooms::Unknown => TeamType::Unknown,
                OtherRooms::ByAge => by_age(),
            }
        }
    }
}
