use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::UNPARSEABLE_DURATION;

/// One booking row as extracted from a spreadsheet sheet, forward-fill already applied
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRow {
    pub year: i32,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(year: i32, cells: Vec<String>) -> Self {
        Self { year, cells }
    }

    /// Cell at `idx`, or "" when the row is short or the column is absent
    pub fn cell(&self, idx: Option<usize>) -> &str {
        idx.and_then(|i| self.cells.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// Team classification derived from room and age group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamType {
    Kids,
    #[serde(alias = "Grown-up")]
    Adults,
    Unknown,
}

/// Elapsed escape time in minutes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EscapeTime {
    Minutes(f64),
    Unparseable,
}

impl Serialize for EscapeTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            EscapeTime::Minutes(m) => serializer.serialize_f64(*m),
            EscapeTime::Unparseable => serializer.serialize_str(UNPARSEABLE_DURATION),
        }
    }
}

/// How a row's price was reconstructed from the price column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceNote {
    /// First row of a block; carries the remainder of the block total
    BlockAnchor,
    /// Anchor whose remainder fell below one unit price and was floored
    FlooredAnchor,
    /// Continuation row of a merged block
    BlockMember,
    /// Coupon or gift voucher, priced at the default
    Voucher,
    /// No plausible number found
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPrice {
    pub amount: u32,
    pub note: PriceNote,
}

/// The canonical, typed booking record written per input row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalBookingRecord {
    pub venue: String,
    pub year: i32,
    pub date: Option<NaiveDate>,
    /// `HH:MM` after the venue offset, or the raw value when unparseable
    pub time: String,
    pub casual_time: Option<String>,
    pub room: String,
    pub price: u32,
    pub price_note: PriceNote,
    pub escape_time_minutes: EscapeTime,
    pub age_group: String,
    pub team_type: TeamType,
    pub source: String,
    pub status: String,
    pub celebration: String,
    pub helps: Option<u32>,
    pub admin: Option<String>,
}

impl CanonicalBookingRecord {
    /// Column order of the canonical output file
    pub const HEADERS: [&'static str; 16] = [
        "venue",
        "year",
        "date",
        "time",
        "casual_time",
        "room",
        "price",
        "price_note",
        "escape_time_minutes",
        "age_group",
        "team_type",
        "source",
        "status",
        "celebration",
        "helps",
        "admin",
    ];
}
