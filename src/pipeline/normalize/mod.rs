// Row-level normalizer components and the per-venue profile that configures them

pub mod age;
pub mod categorical;
pub mod price;
pub mod registry;
pub mod rooms;
pub mod text;
pub mod time;
pub mod venues;

use serde::{Deserialize, Serialize};

pub use age::{AgeBand, AgeClassifier, AgeFill, AgeRules, OtherRooms, RoomAgeHint, TeamRules};
pub use categorical::{CategoricalMapper, CategoryGroup, CategoryTable, Mapping, TextMode};
pub use price::{PriceBlockDecoder, PriceRules, PriceRun, YearPrice};
pub use registry::VenueRegistry;
pub use rooms::{RoomAlias, RoomAliasResolver, RoomPolicy, RoomResolution};
pub use text::TextNormalizer;
pub use time::{AdjustedTime, TimeAdjuster, TimeRules};

/// Header names of the raw columns a venue's sheets use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnMap {
    pub date: String,
    pub time: String,
    pub room: String,
    pub price: String,
    pub escape_time: String,
    pub age: String,
    pub source: String,
    pub status: String,
    pub celebration: String,
    pub helps: String,
    pub admin: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            time: "Time".to_string(),
            room: "Room".to_string(),
            price: "Price".to_string(),
            escape_time: "EscapeTime".to_string(),
            age: "Age".to_string(),
            source: "Source".to_string(),
            status: "Status".to_string(),
            celebration: "Celebration".to_string(),
            helps: "Helps".to_string(),
            admin: "Admin".to_string(),
        }
    }
}

/// Everything that differs between venue variants.
/// Loaded once, compiled into a `RecordPipeline`, never mutated during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueProfile {
    pub name: String,
    #[serde(default)]
    pub columns: ColumnMap,
    pub rooms: Vec<RoomAlias>,
    pub room_policy: RoomPolicy,
    /// Rows whose room is outside this set are dropped after resolution
    #[serde(default)]
    pub allowed_rooms: Option<Vec<String>>,
    pub source: CategoryTable,
    pub status: CategoryTable,
    pub celebration: CategoryTable,
    pub time: TimeRules,
    pub age: AgeRules,
    pub teams: TeamRules,
    pub price: PriceRules,
    /// Drop exact duplicate raw rows before decoding
    #[serde(default)]
    pub drop_duplicate_rows: bool,
}
