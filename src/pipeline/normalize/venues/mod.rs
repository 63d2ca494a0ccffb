// Built-in venue profiles

pub mod kaunas;
pub mod vilnius;

use super::VenueProfile;

/// Profiles available without a config file
pub fn builtin_profiles() -> Vec<VenueProfile> {
    vec![kaunas::profile(), vilnius::profile()]
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
