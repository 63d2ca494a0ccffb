use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::TextNormalizer;
use crate::error::{NormalizeError, Result};
use crate::types::EscapeTime;

const MINUTES_PER_DAY: i64 = 24 * 60;

static CLOCK_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s+days?\s+)?(\d+):(\d{1,2}):(\d{1,2}(?:\.\d+)?)$").expect("static regex")
});

static UNIT_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)\b").expect("static regex")
});

/// Per-venue clock time rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeRules {
    /// Minutes subtracted from every recorded clock time
    #[serde(default)]
    pub offset_minutes: i64,
    /// Ordered `HH:MM` bucket labels
    pub casual_buckets: Vec<String>,
    /// Label for times before the first bucket; `None` rounds them to the nearest bucket
    #[serde(default)]
    pub early_label: Option<String>,
}

/// A clock time after offset correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustedTime {
    Parsed(NaiveTime),
    /// Input that could not be read as a clock time, kept verbatim
    Raw(String),
}

impl AdjustedTime {
    pub fn display(&self) -> String {
        match self {
            AdjustedTime::Parsed(t) => t.format("%H:%M").to_string(),
            AdjustedTime::Raw(raw) => raw.clone(),
        }
    }
}

pub struct TimeAdjuster {
    offset_minutes: i64,
    buckets: Vec<(NaiveTime, String)>,
    early_label: Option<String>,
}

impl TimeAdjuster {
    pub fn new(rules: &TimeRules) -> Result<Self> {
        let buckets = rules
            .casual_buckets
            .iter()
            .map(|label| {
                NaiveTime::parse_from_str(label, "%H:%M")
                    .map(|t| (t, label.clone()))
                    .map_err(|e| NormalizeError::Config(format!("invalid casual bucket '{}': {}", label, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        if buckets.is_empty() {
            return Err(NormalizeError::Config("at least one casual bucket is required".to_string()));
        }
        Ok(Self {
            offset_minutes: rules.offset_minutes,
            buckets,
            early_label: rules.early_label.clone(),
        })
    }

    /// Hours and minutes of an `HH:MM[:SS]` value; a leading date part is ignored
    pub fn parse_clock(raw: &str) -> Option<(u32, u32)> {
        let token = raw.trim().rsplit(' ').next()?;
        let mut parts = token.split(':');
        let hours = parts.next()?.trim().parse::<u32>().ok()?;
        let minutes = parts.next()?.trim().parse::<u32>().ok()?;
        (hours < 24 && minutes < 60).then_some((hours, minutes))
    }

    /// Subtract the venue offset, wrapping around midnight.
    /// Unparseable input is kept as-is.
    pub fn adjust(&self, raw: &str) -> AdjustedTime {
        let Some((hours, minutes)) = Self::parse_clock(raw) else {
            return AdjustedTime::Raw(raw.trim().to_string());
        };
        let total = (hours as i64 * 60 + minutes as i64 - self.offset_minutes).rem_euclid(MINUTES_PER_DAY);
        match NaiveTime::from_hms_opt((total / 60) as u32, (total % 60) as u32, 0) {
            Some(t) => AdjustedTime::Parsed(t),
            None => AdjustedTime::Raw(raw.trim().to_string()),
        }
    }

    /// Nearest casual bucket; exact ties go to the earlier-declared bucket
    pub fn casual(&self, time: NaiveTime) -> String {
        let time = time.with_second(0).unwrap_or(time);
        if let Some(early) = &self.early_label {
            if time < self.buckets[0].0 {
                return early.clone();
            }
        }
        let mut best = &self.buckets[0];
        let mut best_diff = i64::MAX;
        for bucket in &self.buckets {
            let diff = (bucket.0 - time).num_seconds().abs();
            if diff < best_diff {
                best_diff = diff;
                best = bucket;
            }
        }
        best.1.clone()
    }

    /// Elapsed minutes of a duration value, rounded to two decimals
    pub fn escape_minutes(raw: &str) -> EscapeTime {
        if TextNormalizer::is_missing(raw) {
            return EscapeTime::Unparseable;
        }
        match Self::duration_seconds(raw.trim()) {
            Some(secs) if secs >= 0.0 => EscapeTime::Minutes((secs / 60.0 * 100.0).round() / 100.0),
            _ => EscapeTime::Unparseable,
        }
    }

    fn duration_seconds(value: &str) -> Option<f64> {
        if let Some(caps) = CLOCK_DURATION_RE.captures(value) {
            let days: f64 = caps.get(1).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
            let hours: f64 = caps[2].parse().ok()?;
            let minutes: f64 = caps[3].parse().ok()?;
            let seconds: f64 = caps[4].parse().ok()?;
            if minutes >= 60.0 || seconds >= 60.0 {
                return None;
            }
            return Some(days * 86_400.0 + hours * 3_600.0 + minutes * 60.0 + seconds);
        }

        // "52min", "1h 5m", "45 s": every non-blank character must belong to a unit token
        let mut total = 0.0;
        let mut consumed = 0;
        for caps in UNIT_DURATION_RE.captures_iter(value) {
            let amount: f64 = caps[1].parse().ok()?;
            let unit = caps[2].to_ascii_lowercase();
            let factor = match unit.chars().next()? {
                'h' => 3_600.0,
                'm' => 60.0,
                _ => 1.0,
            };
            total += amount * factor;
            consumed += caps[0].chars().filter(|c| !c.is_whitespace()).count();
        }
        let significant = value.chars().filter(|c| !c.is_whitespace()).count();
        (consumed > 0 && consumed == significant).then_some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjuster(offset: i64, early: Option<&str>) -> TimeAdjuster {
        TimeAdjuster::new(&TimeRules {
            offset_minutes: offset,
            casual_buckets: ["12:00", "14:00", "16:00", "18:00"].iter().map(|s| s.to_string()).collect(),
            early_label: early.map(|s| s.to_string()),
        })
        .unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_offset_wraps_past_midnight() {
        let adj = adjuster(90, None);
        assert_eq!(adj.adjust("00:30").display(), "23:00");
        assert_eq!(adj.adjust("14:15:00").display(), "12:45");
        assert_eq!(adj.adjust("1900-01-01 10:00:00").display(), "08:30");
    }

    #[test]
    fn test_unparseable_time_passes_through() {
        let adj = adjuster(90, None);
        assert_eq!(adj.adjust(" vakare "), AdjustedTime::Raw("vakare".to_string()));
        assert_eq!(adj.adjust("25:00").display(), "25:00");
    }

    #[test]
    fn test_casual_rounding() {
        let adj = adjuster(0, Some("10:00"));
        assert_eq!(adj.casual(hm(15, 0)), "14:00");
        assert_eq!(adj.casual(hm(11, 0)), "10:00");
        assert_eq!(adj.casual(hm(17, 10)), "18:00");
        assert_eq!(adj.casual(hm(23, 30)), "18:00");
    }

    #[test]
    fn test_casual_tie_goes_to_earlier_bucket() {
        let adj = adjuster(0, None);
        assert_eq!(adj.casual(hm(13, 0)), "12:00");
        // Without an early label, mornings round to the first bucket
        assert_eq!(adj.casual(hm(9, 0)), "12:00");
    }

    #[test]
    fn test_escape_minutes() {
        assert_eq!(TimeAdjuster::escape_minutes("00:45:30"), EscapeTime::Minutes(45.5));
        assert_eq!(TimeAdjuster::escape_minutes("1:02:20"), EscapeTime::Minutes(62.33));
        assert_eq!(TimeAdjuster::escape_minutes("0 days 00:58:00"), EscapeTime::Minutes(58.0));
        assert_eq!(TimeAdjuster::escape_minutes("52min"), EscapeTime::Minutes(52.0));
        assert_eq!(TimeAdjuster::escape_minutes("1h 5m"), EscapeTime::Minutes(65.0));
        assert_eq!(TimeAdjuster::escape_minutes("00:00:00"), EscapeTime::Minutes(0.0));
    }

    #[test]
    fn test_escape_minutes_sentinel() {
        assert_eq!(TimeAdjuster::escape_minutes(""), EscapeTime::Unparseable);
        assert_eq!(TimeAdjuster::escape_minutes("NaN"), EscapeTime::Unparseable);
        assert_eq!(TimeAdjuster::escape_minutes("neišėjo"), EscapeTime::Unparseable);
        assert_eq!(TimeAdjuster::escape_minutes("52 min and some"), EscapeTime::Unparseable);
    }

    #[test]
    fn test_rejects_bad_bucket() {
        let rules = TimeRules {
            offset_minutes: 0,
            casual_buckets: vec!["noon".to_string()],
            early_label: None,
        };
        assert!(TimeAdjuster::new(&rules).is_err());
    }
}
