use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PLAUSIBLE_PRICE, MIN_PLAUSIBLE_PRICE, PRICE_PLACEHOLDERS, VOUCHER_TOKENS};
use crate::types::{DecodedPrice, PriceNote};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Default unit price for one booking year
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearPrice {
    pub year: i32,
    pub price: u32,
}

/// Per-venue price column rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRules {
    pub min_plausible: u32,
    pub max_plausible: u32,
    /// Cells that continue the block above them (compared uppercased and trimmed)
    pub placeholders: Vec<String>,
    /// Substrings marking a voucher payment
    pub voucher_tokens: Vec<String>,
    /// Default unit price by booking year
    pub default_prices: Vec<YearPrice>,
    /// Unit price for years missing from `default_prices`
    pub fallback_default: u32,
}

impl PriceRules {
    pub fn with_defaults(default_prices: Vec<YearPrice>, fallback_default: u32) -> Self {
        Self {
            min_plausible: MIN_PLAUSIBLE_PRICE,
            max_plausible: MAX_PLAUSIBLE_PRICE,
            placeholders: PRICE_PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
            voucher_tokens: VOUCHER_TOKENS.iter().map(|s| s.to_string()).collect(),
            default_prices,
            fallback_default,
        }
    }

    pub fn default_price(&self, year: i32) -> u32 {
        self.default_prices
            .iter()
            .find(|p| p.year == year)
            .map_or(self.fallback_default, |p| p.price)
    }
}

/// A run of rows sharing one price cell, as discovered by the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRun {
    /// Plausible total on the anchor row followed by `members` placeholder rows
    Block { start: usize, total: u32, members: usize },
    Voucher { row: usize },
    Unpriced { row: usize },
}

impl PriceRun {
    /// Number of rows the run covers
    pub fn rows(&self) -> usize {
        match self {
            PriceRun::Block { members, .. } => 1 + members,
            PriceRun::Voucher { .. } | PriceRun::Unpriced { .. } => 1,
        }
    }
}

/// Rebuilds per-row prices from a price column with merged total cells
pub struct PriceBlockDecoder<'a> {
    rules: &'a PriceRules,
    default_price: u32,
    /// Tokens uppercased and trimmed to match how cells are compared
    placeholders: Vec<String>,
    voucher_tokens: Vec<String>,
}

impl<'a> PriceBlockDecoder<'a> {
    pub fn new(rules: &'a PriceRules, year: i32) -> Self {
        Self {
            rules,
            default_price: rules.default_price(year),
            placeholders: rules.placeholders.iter().map(|t| t.trim().to_uppercase()).collect(),
            voucher_tokens: rules.voucher_tokens.iter().map(|t| t.trim().to_uppercase()).collect(),
        }
    }

    pub fn default_price(&self) -> u32 {
        self.default_price
    }

    /// First number in the cell within the plausible price range
    pub fn plausible_total(&self, cell: &str) -> Option<u32> {
        NUMBER_RE
            .find_iter(cell)
            .filter_map(|m| m.as_str().parse::<u64>().ok())
            .find(|n| (self.rules.min_plausible as u64..=self.rules.max_plausible as u64).contains(n))
            .map(|n| n as u32)
    }

    fn is_placeholder(&self, cell: &str) -> bool {
        self.placeholders.iter().any(|p| p == cell)
    }

    fn is_voucher(&self, cell: &str) -> bool {
        self.voucher_tokens
            .iter()
            .any(|t| !t.is_empty() && cell.contains(t.as_str()))
    }

    /// Lazily group the column into runs, left to right.
    /// A row with a plausible number always starts a new block.
    pub fn runs<'c>(&'c self, column: &'c [String]) -> PriceRuns<'a, 'c> {
        let values = column.iter().map(|v| v.trim().to_uppercase()).collect();
        PriceRuns {
            decoder: self,
            values,
            cursor: 0,
        }
    }

    /// One decoded price per input cell, same order and length
    pub fn decode(&self, column: &[String]) -> Vec<DecodedPrice> {
        let default = self.default_price;
        let mut out = Vec::with_capacity(column.len());
        for run in self.runs(column) {
            match run {
                PriceRun::Block { total, members, .. } => {
                    let remainder = total as i64 - default as i64 * members as i64;
                    let (amount, note) = if remainder < default as i64 {
                        (default, PriceNote::FlooredAnchor)
                    } else {
                        (remainder as u32, PriceNote::BlockAnchor)
                    };
                    out.push(DecodedPrice { amount, note });
                    out.extend(std::iter::repeat(DecodedPrice {
                        amount: default,
                        note: PriceNote::BlockMember,
                    }).take(members));
                }
                PriceRun::Voucher { .. } => out.push(DecodedPrice {
                    amount: default,
                    note: PriceNote::Voucher,
                }),
                PriceRun::Unpriced { .. } => out.push(DecodedPrice {
                    amount: default,
                    note: PriceNote::Default,
                }),
            }
        }
        out
    }
}

pub struct PriceRuns<'a, 'c> {
    decoder: &'c PriceBlockDecoder<'a>,
    values: Vec<String>,
    cursor: usize,
}

impl Iterator for PriceRuns<'_, '_> {
    type Item = PriceRun;

    fn next(&mut self) -> Option<PriceRun> {
        let i = self.cursor;
        let cell = self.values.get(i)?;

        let run = if let Some(total) = self.decoder.plausible_total(cell) {
            let members = self.values[i + 1..]
                .iter()
                .take_while(|v| self.decoder.is_placeholder(v))
                .count();
            PriceRun::Block { start: i, total, members }
        } else if self.decoder.is_voucher(cell) {
            PriceRun::Voucher { row: i }
        } else {
            PriceRun::Unpriced { row: i }
        };

        self.cursor += run.rows();
        Some(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(default: u32) -> PriceRules {
        PriceRules::with_defaults(vec![YearPrice { year: 2023, price: default }], 30)
    }

    fn column(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn amounts(prices: &[DecodedPrice]) -> Vec<u32> {
        prices.iter().map(|p| p.amount).collect()
    }

    #[test]
    fn test_block_with_voucher_and_standalone_placeholder() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let prices = decoder.decode(&column(&["100", "", "", "COUPON", "NO_PRICE"]));
        assert_eq!(amounts(&prices), vec![50, 50, 50, 50, 50]);
        // 100 - 2*50 leaves nothing for the anchor, so it is floored
        assert_eq!(prices[0].note, PriceNote::FlooredAnchor);
        assert_eq!(prices[1].note, PriceNote::BlockMember);
        assert_eq!(prices[3].note, PriceNote::Voucher);
        assert_eq!(prices[4].note, PriceNote::Default);
    }

    #[test]
    fn test_single_total_without_members() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let prices = decoder.decode(&column(&["400"]));
        assert_eq!(amounts(&prices), vec![400]);
    }

    #[test]
    fn test_anchor_absorbs_remainder() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let prices = decoder.decode(&column(&["230 EUR", "nan", " ", "120"]));
        assert_eq!(amounts(&prices), vec![130, 50, 50, 120]);
    }

    #[test]
    fn test_remainder_equal_to_default_is_not_floored() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let prices = decoder.decode(&column(&["150", "", ""]));
        assert_eq!(amounts(&prices), vec![50, 50, 50]);
        assert_eq!(prices[0].note, PriceNote::BlockAnchor);
    }

    #[test]
    fn test_configured_tokens_match_case_insensitively() {
        let mut rules = rules(50);
        rules.placeholders = vec!["".to_string(), " no_price ".to_string()];
        rules.voucher_tokens = vec!["kuponas".to_string()];
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let prices = decoder.decode(&column(&["200", "No_Price", "Kuponas 2023"]));
        assert_eq!(amounts(&prices), vec![150, 50, 50]);
        assert_eq!(prices[1].note, PriceNote::BlockMember);
        assert_eq!(prices[2].note, PriceNote::Voucher);
    }

    #[test]
    fn test_anchor_is_floored_at_default() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let prices = decoder.decode(&column(&["90", "", ""]));
        assert_eq!(amounts(&prices), vec![50, 50, 50]);
        assert_eq!(prices[0].note, PriceNote::FlooredAnchor);
    }

    #[test]
    fn test_implausible_numbers_are_ignored() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        // 2023 and 12 fall outside the plausible range; 80 is the total
        assert_eq!(decoder.plausible_total("2023-12 paid 80"), Some(80));
        let prices = decoder.decode(&column(&["5 people", "", "1000"]));
        // "5 people" has no plausible number, so the blank after it is its own row
        assert_eq!(amounts(&prices), vec![50, 50, 50]);
        assert!(prices.iter().all(|p| p.note == PriceNote::Default));
    }

    #[test]
    fn test_new_number_starts_new_block() {
        let rules = rules(40);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let runs: Vec<PriceRun> = decoder.runs(&column(&["160", "", "100", ""])).collect();
        assert_eq!(
            runs,
            vec![
                PriceRun::Block { start: 0, total: 160, members: 1 },
                PriceRun::Block { start: 2, total: 100, members: 1 },
            ]
        );
    }

    #[test]
    fn test_unknown_year_uses_fallback_default() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 1999);
        assert_eq!(decoder.default_price(), 30);
    }

    #[test]
    fn test_output_length_and_floor_hold_for_mixed_column() {
        let rules = rules(50);
        let decoder = PriceBlockDecoder::new(&rules, 2023);
        let input = column(&["", "GIFT", "70", "", "", "x", "600", "nan", "601", "30"]);
        let prices = decoder.decode(&input);
        assert_eq!(prices.len(), input.len());
        assert!(prices.iter().all(|p| p.amount >= 50));
    }
}
