/// Venue profile names and shared sentinel values.
/// These keep the CLI, the registry and the built-in profiles in agreement.

// Built-in venue profile names (used in CLI)
pub const KAUNAS_VENUE: &str = "kaunas";
pub const VILNIUS_VENUE: &str = "vilnius";

/// Label for an age that is absent, non-numeric or below every band
pub const UNKNOWN_AGE_GROUP: &str = "N/A";

/// Written in place of an escape time that could not be parsed
pub const UNPARSEABLE_DURATION: &str = "-";

/// Referral source assumed when the cell is empty
pub const DEFAULT_SOURCE: &str = "ONLINE";

/// Raw price cells that continue a merged price block
pub const PRICE_PLACEHOLDERS: &[&str] = &["", "NO_PRICE", "NO_VALUE", "NAN", "NONE"];

/// Non-numeric payment markers in the price column
pub const VOUCHER_TOKENS: &[&str] = &["COUPON", "GIFT"];

/// Inclusive range of numbers accepted as a block total
pub const MIN_PLAUSIBLE_PRICE: u32 = 30;
pub const MAX_PLAUSIBLE_PRICE: u32 = 600;

/// Prefix of normalized output files, and the merge input filter
pub const CLEANED_PREFIX: &str = "cleaned_";
