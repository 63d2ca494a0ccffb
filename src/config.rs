use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NormalizeError, Result};
use crate::pipeline::anonymize::AnonymizeConfig;
use crate::pipeline::normalize::venues::builtin_profiles;
use crate::pipeline::normalize::{VenueProfile, VenueRegistry};

/// Environment variable naming the config file when `--config` is not given
pub const CONFIG_ENV: &str = "BOOKING_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "booking.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub merged_file: PathBuf,
    pub file_prefix: String,
    pub file_suffix: String,
    pub log_dir: PathBuf,
    /// Prometheus text snapshot written at the end of each run
    pub metrics_file: Option<PathBuf>,
    /// Extra or overriding venue profiles
    pub venues: Vec<VenueProfile>,
    pub anonymize: AnonymizeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/cleaned"),
            merged_file: PathBuf::from("data/merged.csv"),
            file_prefix: "data_".to_string(),
            file_suffix: ".csv".to_string(),
            log_dir: PathBuf::from("logs"),
            metrics_file: None,
            venues: Vec::new(),
            anonymize: AnonymizeConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, else `$BOOKING_CONFIG`, else `booking.toml` if present.
    /// Without any file the defaults and built-in venues are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let config_path = match explicit {
            Some(p) => p,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            NormalizeError::Config(format!("Failed to read config file '{}': {}", config_path.display(), e))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Built-in venues plus the configured ones, compiled
    pub fn registry(&self) -> Result<VenueRegistry> {
        VenueRegistry::with_profiles(builtin_profiles().into_iter().chain(self.venues.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::venues::kaunas;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.input_dir, PathBuf::from("data/raw"));
        assert_eq!(config.file_prefix, "data_");
        assert!(config.metrics_file.is_none());
        assert_eq!(config.anonymize, AnonymizeConfig::default());
        assert_eq!(config.registry().unwrap().list_venues(), vec!["kaunas", "vilnius"]);
    }

    #[test]
    fn test_partial_overrides() {
        let config = Config::from_toml(
            r#"
            input_dir = "sheets"
            metrics_file = "out/metrics.prom"

            [anonymize]
            revenue_offset = 0.0
            pseudonyms = ["A", "B"]
            "#,
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("sheets"));
        assert_eq!(config.output_dir, PathBuf::from("data/cleaned"));
        assert_eq!(config.metrics_file, Some(PathBuf::from("out/metrics.prom")));
        assert_eq!(config.anonymize.revenue_offset, 0.0);
        assert_eq!(config.anonymize.pseudonyms, vec!["A", "B"]);
        // Untouched tables keep their defaults
        assert_eq!(config.anonymize.excluded_date_prefixes, vec!["2018"]);
    }

    #[test]
    fn test_venue_profile_round_trips_through_toml() {
        let mut profile = kaunas::profile();
        profile.name = "kaunas_annex".to_string();
        #[derive(serde::Serialize)]
        struct Venues<'a> {
            venues: &'a [VenueProfile],
        }
        let text = toml::to_string(&Venues { venues: std::slice::from_ref(&profile) }).unwrap();
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.venues, vec![profile]);
        assert!(config.registry().unwrap().get("kaunas_annex").is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/booking.toml"))).unwrap_err();
        assert!(matches!(err, NormalizeError::Config(_)));
    }
}
