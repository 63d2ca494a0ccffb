use std::collections::BTreeMap;

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::UNPARSEABLE_DURATION;
use crate::error::{NormalizeError, Result};
use crate::pipeline::table::Table;

fn map_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Pseudonymization of a merged canonical table before it is shared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnonymizeConfig {
    /// Rows whose `date` starts with one of these are removed
    pub excluded_date_prefixes: Vec<String>,
    pub room_codes: BTreeMap<String, String>,
    pub source_codes: BTreeMap<String, String>,
    pub status_codes: BTreeMap<String, String>,
    pub celebration_codes: BTreeMap<String, String>,
    pub venue_codes: BTreeMap<String, String>,
    pub age_swap: BTreeMap<String, String>,
    /// Added to every price; blank or non-numeric prices count as 0
    pub revenue_offset: f64,
    /// Subtracted from numeric escape times, floored at 0
    pub escape_time_offset_minutes: f64,
    pub pseudonyms: Vec<String>,
    pub drop_columns: Vec<String>,
    /// Applied last, after every value transform
    pub rename: BTreeMap<String, String>,
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self {
            excluded_date_prefixes: vec!["2018".to_string()],
            room_codes: map_of(&[
                ("UZ GROTU", "VS1"),
                ("XFAILAI", "VS2"),
                ("NEIMANOMA MISIJA", "VS3"),
                ("ALKATRASAS", "VS4"),
                ("KODAS BANKAS", "VS5"),
                ("ALISA", "KV1"),
                ("SMEKLU PASLAPTYS", "KV2"),
                ("SLAPTA LABORATORIJA", "KV3"),
                ("APLEISTAS NAMAS", "AV1"),
                ("HARIS", "AV2"),
                ("BANKO APIPLESIMAS", "VV1"),
                ("SLAPTAS KALEJIMAS", "VV2"),
                ("ATEIVIU KAMBARYS", "VV3"),
                ("APLEISTA LABORATORIJA", "VV4"),
                ("SLAPTIEJI AGENTAI", "VV5"),
                ("MAFIJA", "AS1"),
                ("MAFIJA2", "AS2"),
                ("APOKALIPSE", "AS3"),
                ("SERIJINIS ZUDIKAS", "AS4"),
                ("DA VINCI", "KS1"),
                ("AKLAS APIPLESIMAS", "KS2"),
            ]),
            source_codes: map_of(&[
                ("RETURNING", "SRC1"),
                ("VISITED", "SRC1"),
                ("ONLINE", "SRC2"),
                ("COUPON", "SRC3"),
                ("REFERRED", "SRC4"),
                ("SOCIAL MEDIA", "SRC5"),
                ("SOCIAL", "SRC5"),
                ("CAMPS", "SRC6"),
                ("CAMP", "SRC6"),
            ]),
            status_codes: map_of(&[
                ("Friends", "GRP1"),
                ("Organization", "GRP2"),
                ("Company", "GRP2"),
                ("Colleagues", "GRP3"),
                ("Students", "GRP4"),
                ("Unknown", "GRP5"),
                ("Family", "GRP6"),
                ("Friends & Family", "GRP7"),
                ("Foreigners", "GRP8"),
            ]),
            celebration_codes: map_of(&[
                ("None", "EVT1"),
                ("Birthday", "EVT2"),
                ("Company event", "EVT3"),
                ("Other events", "EVT4"),
                ("Other celebrations", "EVT4"),
                ("Educational", "EVT5"),
            ]),
            venue_codes: map_of(&[("KAUNAS", "City1"), ("VILNIUS", "City2")]),
            age_swap: map_of(&[("19–24", "25–29"), ("25–32", "19–24"), ("33–40", "30+"), ("41+", "30+")]),
            revenue_offset: 20.0,
            escape_time_offset_minutes: 8.0,
            pseudonyms: [
                "Asta", "Rokas", "Egle", "Tomas", "Lina", "Marius", "Vaida", "Simonas", "Rasa", "Dainius",
                "Paulius", "Zenonas", "Akvilė", "Tauras", "Laimute",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            drop_columns: ["age", "price_note", "comment"].iter().map(|s| s.to_string()).collect(),
            rename: map_of(&[
                ("time", "Time"),
                ("room", "Room type"),
                ("price", "Revenue"),
                ("helps", "Helps"),
                ("escape_time_minutes", "Escape Time"),
                ("age_group", "Age Group"),
                ("source", "Source"),
                ("status", "Status"),
                ("celebration", "Celebration"),
                ("admin", "Admin"),
                ("venue", "City"),
            ]),
        }
    }
}

pub struct Anonymizer {
    config: AnonymizeConfig,
    rng: StdRng,
}

impl Anonymizer {
    pub fn new(config: AnonymizeConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible pseudonym assignment
    pub fn with_seed(config: AnonymizeConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn apply(&mut self, table: Table) -> Result<Table> {
        let Table { headers, mut rows } = table;
        let col = |name: &str| headers.iter().position(|h| h == name);

        if let Some(date) = col("date") {
            let before = rows.len();
            rows.retain(|row| !self.config.excluded_date_prefixes.iter().any(|p| row[date].starts_with(p.as_str())));
            info!(removed = before - rows.len(), remaining = rows.len(), "excluded rows by date prefix");
        }

        let code_maps = [
            ("room", &self.config.room_codes),
            ("source", &self.config.source_codes),
            ("status", &self.config.status_codes),
            ("celebration", &self.config.celebration_codes),
            ("age_group", &self.config.age_swap),
        ];
        for (name, codes) in code_maps {
            if let Some(idx) = col(name) {
                for row in rows.iter_mut() {
                    if let Some(code) = codes.get(&row[idx]) {
                        row[idx] = code.clone();
                    }
                }
            }
        }

        if let Some(idx) = col("venue") {
            for row in rows.iter_mut() {
                if let Some(code) = self.config.venue_codes.get(&row[idx].to_uppercase()) {
                    row[idx] = code.clone();
                }
            }
        }

        if let Some(idx) = col("price") {
            for row in rows.iter_mut() {
                let amount = row[idx].trim().parse::<f64>().unwrap_or(0.0) + self.config.revenue_offset;
                row[idx] = format_number(amount);
            }
        }

        if let Some(idx) = col("escape_time_minutes") {
            for row in rows.iter_mut() {
                if row[idx] == UNPARSEABLE_DURATION {
                    continue;
                }
                if let Ok(minutes) = row[idx].trim().parse::<f64>() {
                    let shifted = (minutes - self.config.escape_time_offset_minutes).max(0.0);
                    row[idx] = format_number((shifted * 100.0).round() / 100.0);
                }
            }
        }

        if let Some(idx) = col("admin") {
            if !self.config.pseudonyms.is_empty() {
                // Uneven weights so some admins appear more often than others
                let weights: Vec<f64> = self.config.pseudonyms.iter().map(|_| self.rng.gen_range(0.5..3.0)).collect();
                let dist = WeightedIndex::new(&weights)
                    .map_err(|e| NormalizeError::Config(format!("pseudonym weights: {}", e)))?;
                for row in rows.iter_mut() {
                    row[idx] = self.config.pseudonyms[dist.sample(&mut self.rng)].clone();
                }
            }
        }

        let keep: Vec<usize> = (0..headers.len())
            .filter(|&i| !self.config.drop_columns.contains(&headers[i]))
            .collect();
        let headers = keep
            .iter()
            .map(|&i| self.config.rename.get(&headers[i]).cloned().unwrap_or_else(|| headers[i].clone()))
            .collect();
        let rows = rows
            .into_iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table::new(headers, rows))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged() -> Table {
        let headers = ["venue", "date", "room", "price", "price_note", "escape_time_minutes", "age_group", "source", "status", "celebration", "admin"];
        let rows: [[&str; 11]; 3] = [
            ["kaunas", "2018-03-01", "Room1", "50", "block_anchor", "55", "41+", "ONLINE", "Family", "None", "Jonas"],
            ["vilnius", "2021-07-12", "MAFIJA", "65", "default", "57.5", "25–32", "COUPON", "Students", "Birthday", "Ona"],
            ["vilnius", "2022-01-02", "ROOM2", "", "default", "-", "7–9", "RADIO", "Unknown", "Educational", ""],
        ];
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect(),
        )
    }

    #[test]
    fn test_anonymize_maps_and_renames() {
        let mut anon = Anonymizer::with_seed(AnonymizeConfig::default(), 7);
        let out = anon.apply(merged()).unwrap();

        // 2018 row removed, price_note dropped, columns renamed
        assert_eq!(out.rows.len(), 2);
        assert!(!out.headers.contains(&"price_note".to_string()));
        let col = |name: &str| out.column_index(name).unwrap();

        let first = &out.rows[0];
        assert_eq!(first[col("City")], "City2");
        assert_eq!(first[col("Room type")], "AS1");
        assert_eq!(first[col("Revenue")], "85");
        assert_eq!(first[col("Escape Time")], "49.5");
        assert_eq!(first[col("Age Group")], "19–24");
        assert_eq!(first[col("Source")], "SRC3");
        assert_eq!(first[col("Status")], "GRP4");
        assert_eq!(first[col("Celebration")], "EVT2");

        let second = &out.rows[1];
        // Unmapped values are kept
        assert_eq!(second[col("Room type")], "ROOM2");
        assert_eq!(second[col("Source")], "RADIO");
        assert_eq!(second[col("Revenue")], "20");
        assert_eq!(second[col("Escape Time")], "-");

        let pseudonyms = AnonymizeConfig::default().pseudonyms;
        assert!(out.rows.iter().all(|r| pseudonyms.contains(&r[col("Admin")])));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = Anonymizer::with_seed(AnonymizeConfig::default(), 42).apply(merged()).unwrap();
        let b = Anonymizer::with_seed(AnonymizeConfig::default(), 42).apply(merged()).unwrap();
        assert_eq!(a, b);
    }
}
