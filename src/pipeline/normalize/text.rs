use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Text canonicalization shared by every normalizer component
pub struct TextNormalizer;

impl TextNormalizer {
    /// Uppercase, trim and strip diacritics. `None` and blank input give "".
    pub fn normalize(text: Option<&str>) -> String {
        let Some(text) = text else {
            return String::new();
        };
        let upper = text.trim().to_uppercase();
        let stripped: String = upper.nfd().filter(|c| !is_combining_mark(*c)).collect();
        stripped.trim().to_string()
    }

    /// `normalize`, then keep only `A-Z`, `0-9` and spaces.
    /// Used for room and status labels where punctuation is noise.
    pub fn strict(text: Option<&str>) -> String {
        Self::normalize(text)
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == ' ')
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// True for blank cells and the "NaN"-like sentinels spreadsheets export
    pub fn is_missing(text: &str) -> bool {
        let t = text.trim();
        t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("none")
    }

    /// `normalize` that maps missing-value sentinels to ""
    pub fn cell(text: &str) -> String {
        if Self::is_missing(text) {
            String::new()
        } else {
            Self::normalize(Some(text))
        }
    }
}
