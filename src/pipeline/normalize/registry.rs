use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::venues::builtin_profiles;
use super::VenueProfile;
use crate::error::{NormalizeError, Result};
use crate::pipeline::record::RecordPipeline;

/// Registry of compiled per-venue pipelines
pub struct VenueRegistry {
    pipelines: HashMap<String, Arc<RecordPipeline>>,
}

impl VenueRegistry {
    /// Create a registry with the built-in venue profiles
    pub fn new() -> Result<Self> {
        Self::with_profiles(builtin_profiles())
    }

    /// Compile `profiles` in order; a later profile with an existing name replaces it
    pub fn with_profiles(profiles: impl IntoIterator<Item = VenueProfile>) -> Result<Self> {
        let mut registry = Self {
            pipelines: HashMap::new(),
        };
        for profile in profiles {
            registry.register(&profile)?;
        }
        Ok(registry)
    }

    /// Compile and register a profile under its name
    pub fn register(&mut self, profile: &VenueProfile) -> Result<()> {
        let pipeline = RecordPipeline::from_profile(profile)?;
        if self.pipelines.insert(profile.name.clone(), Arc::new(pipeline)).is_some() {
            info!("venue profile '{}' overridden", profile.name);
        }
        Ok(())
    }

    /// Get the compiled pipeline for a venue
    pub fn get(&self, venue: &str) -> Result<Arc<RecordPipeline>> {
        self.pipelines
            .get(venue)
            .cloned()
            .ok_or_else(|| NormalizeError::UnknownVenue(venue.to_string()))
    }

    /// List all registered venue names, sorted
    pub fn list_venues(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipelines.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KAUNAS_VENUE, VILNIUS_VENUE};
    use crate::pipeline::normalize::venues::kaunas;

    #[test]
    fn test_registry_has_built_in_venues() {
        let registry = VenueRegistry::new().unwrap();
        assert_eq!(registry.list_venues(), vec![KAUNAS_VENUE, VILNIUS_VENUE]);
    }

    #[test]
    fn test_registry_returns_error_for_unknown_venue() {
        let registry = VenueRegistry::new().unwrap();
        assert!(matches!(registry.get("riga"), Err(NormalizeError::UnknownVenue(_))));
    }

    #[test]
    fn test_custom_profile_registers_under_its_name() {
        let mut profile = kaunas::profile();
        profile.name = "kaunas_annex".to_string();
        let registry = VenueRegistry::with_profiles(builtin_profiles().into_iter().chain([profile])).unwrap();
        assert!(registry.get("kaunas_annex").is_ok());
        assert_eq!(registry.list_venues().len(), 3);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let mut profile = kaunas::profile();
        profile.time.casual_buckets = vec!["late".to_string()];
        assert!(VenueRegistry::with_profiles([profile]).is_err());
    }
}
