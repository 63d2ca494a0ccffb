use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{NormalizeError, Result};
use crate::pipeline::normalize::{
    AdjustedTime, AgeClassifier, CategoricalMapper, ColumnMap, PriceBlockDecoder, PriceRules,
    RoomAliasResolver, RoomResolution, TextNormalizer, TimeAdjuster, VenueProfile,
};
use crate::pipeline::table::Table;
use crate::types::{CanonicalBookingRecord, EscapeTime, PriceNote, RawRow};

/// Row counts and fallbacks observed while normalizing one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub input_rows: usize,
    pub duplicate_rows_dropped: usize,
    pub disallowed_room_rows: usize,
    pub output_rows: usize,
    pub floored_anchors: usize,
    pub default_prices: usize,
    pub voucher_rows: usize,
    pub unparseable_times: usize,
    pub unparseable_durations: usize,
    pub room_passthroughs: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub records: Vec<CanonicalBookingRecord>,
    pub stats: BatchStats,
}

/// Column positions resolved against one file's header row
struct ColumnIndex {
    date: Option<usize>,
    time: Option<usize>,
    room: usize,
    price: usize,
    escape_time: Option<usize>,
    age: Option<usize>,
    source: Option<usize>,
    status: Option<usize>,
    celebration: Option<usize>,
    helps: Option<usize>,
    admin: Option<usize>,
}

impl ColumnIndex {
    fn resolve(columns: &ColumnMap, headers: &[String], file: &str) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| NormalizeError::MissingColumn {
                column: name.to_string(),
                file: file.to_string(),
            })
        };
        Ok(Self {
            date: find(&columns.date),
            time: find(&columns.time),
            room: require(&columns.room)?,
            price: require(&columns.price)?,
            escape_time: find(&columns.escape_time),
            age: find(&columns.age),
            source: find(&columns.source),
            status: find(&columns.status),
            celebration: find(&columns.celebration),
            helps: find(&columns.helps),
            admin: find(&columns.admin),
        })
    }
}

/// One venue's compiled normalization rules, applied to a whole file at a time
pub struct RecordPipeline {
    name: String,
    columns: ColumnMap,
    rooms: RoomAliasResolver,
    source: CategoricalMapper,
    status: CategoricalMapper,
    celebration: CategoricalMapper,
    time: TimeAdjuster,
    ages: AgeClassifier,
    price: PriceRules,
    drop_duplicate_rows: bool,
}

impl RecordPipeline {
    pub fn from_profile(profile: &VenueProfile) -> Result<Self> {
        Ok(Self {
            name: profile.name.clone(),
            columns: profile.columns.clone(),
            rooms: RoomAliasResolver::new(&profile.rooms, profile.room_policy, profile.allowed_rooms.as_deref()),
            source: CategoricalMapper::new(&profile.source)?,
            status: CategoricalMapper::new(&profile.status)?,
            celebration: CategoricalMapper::new(&profile.celebration)?,
            time: TimeAdjuster::new(&profile.time)?,
            ages: AgeClassifier::new(profile.age.clone(), profile.teams.clone()),
            price: profile.price.clone(),
            drop_duplicate_rows: profile.drop_duplicate_rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalize a file's table; every row carries the file's year
    pub fn normalize_table(&self, table: &Table, year: i32, file: &str) -> Result<NormalizedBatch> {
        let rows = table
            .rows
            .iter()
            .map(|cells| RawRow::new(year, cells.clone()))
            .collect();
        self.normalize_rows(&table.headers, rows, year, file)
    }

    /// Normalize the ordered rows of one file.
    /// Fails the whole file on a missing required column or, for strict venues, an unknown room.
    #[instrument(skip(self, headers, rows), fields(venue = %self.name))]
    pub fn normalize_rows(&self, headers: &[String], rows: Vec<RawRow>, year: i32, file: &str) -> Result<NormalizedBatch> {
        let mut stats = BatchStats {
            input_rows: rows.len(),
            ..Default::default()
        };
        let cols = ColumnIndex::resolve(&self.columns, headers, file)?;

        let rows = if self.drop_duplicate_rows {
            let mut seen = HashSet::new();
            let kept: Vec<RawRow> = rows.into_iter().filter(|r| seen.insert(r.cells.clone())).collect();
            stats.duplicate_rows_dropped = stats.input_rows - kept.len();
            kept
        } else {
            rows
        };

        // Price blocks span rows, so the column is decoded before any row is built
        let price_column: Vec<String> = rows.iter().map(|r| r.cell(Some(cols.price)).to_string()).collect();
        let prices = PriceBlockDecoder::new(&self.price, year).decode(&price_column);

        let mut records = Vec::with_capacity(rows.len());
        for (idx, (row, price)) in rows.iter().zip(prices).enumerate() {
            let room = match self.rooms.resolve(row.cell(Some(cols.room)))? {
                RoomResolution::Known(code) => code,
                RoomResolution::Passthrough(text) => {
                    warn!(row = idx, room = %text, "room not in alias table, keeping normalized label");
                    stats.room_passthroughs += 1;
                    text
                }
            };

            if !self.rooms.is_allowed(&room) {
                debug!(row = idx, room = %room, "room outside allow-set, dropping row");
                stats.disallowed_room_rows += 1;
                continue;
            }

            match price.note {
                PriceNote::FlooredAnchor => {
                    warn!(row = idx, raw = %price_column[idx], price = price.amount, "block total below members' share, anchor floored at default price");
                    stats.floored_anchors += 1;
                }
                PriceNote::Default => {
                    debug!(row = idx, raw = %price_column[idx], "no plausible price, using default");
                    stats.default_prices += 1;
                }
                PriceNote::Voucher => stats.voucher_rows += 1,
                PriceNote::BlockAnchor | PriceNote::BlockMember => {}
            }

            let raw_time = row.cell(cols.time);
            let (time, casual_time) = match self.time.adjust(raw_time) {
                AdjustedTime::Parsed(t) => (AdjustedTime::Parsed(t).display(), Some(self.time.casual(t))),
                raw @ AdjustedTime::Raw(_) => {
                    if !TextNormalizer::is_missing(raw_time) {
                        debug!(row = idx, raw = %raw_time, "unparseable clock time");
                        stats.unparseable_times += 1;
                    }
                    (raw.display(), None)
                }
            };

            let raw_escape = row.cell(cols.escape_time);
            let escape_time_minutes = TimeAdjuster::escape_minutes(raw_escape);
            // Blank cells fall back silently; only garbled values are counted
            if escape_time_minutes == EscapeTime::Unparseable && !TextNormalizer::is_missing(raw_escape) {
                debug!(row = idx, raw = %raw_escape, "unparseable escape time");
                stats.unparseable_durations += 1;
            }

            let age_group = self.ages.categorize(row.cell(cols.age));
            let age_group = self.ages.fill_from_room(age_group, &room);
            let team_type = self.ages.team_type(&room, &age_group);

            records.push(CanonicalBookingRecord {
                venue: self.name.clone(),
                year,
                date: parse_date(row.cell(cols.date)),
                time,
                casual_time,
                room,
                price: price.amount,
                price_note: price.note,
                escape_time_minutes,
                age_group,
                team_type,
                source: self.source.map(row.cell(cols.source)),
                status: self.status.map(row.cell(cols.status)),
                celebration: self.celebration.map(row.cell(cols.celebration)),
                helps: parse_count(row.cell(cols.helps)),
                admin: non_blank(row.cell(cols.admin)),
            });
        }

        stats.output_rows = records.len();
        Ok(NormalizedBatch { records, stats })
    }
}

/// Calendar date from the formats the sheets use; a trailing time part is ignored
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y.%m.%d"))
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(day, "%d.%m.%Y"))
        .or_else(|_| NaiveDate::parse_from_str(day, "%d/%m/%Y"))
        .ok()
}

fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u32)
    })
}

fn non_blank(raw: &str) -> Option<String> {
    (!TextNormalizer::is_missing(raw)).then(|| raw.trim().to_string())
}
