use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("No 4-digit year in file name: {file}")]
    MissingYear { file: String },

    #[error("Room label '{raw}' (normalized '{normalized}') matches no known room")]
    UnresolvedRoom { raw: String, normalized: String },

    #[error("Unknown venue profile: {0}")]
    UnknownVenue(String),

    #[error("Column '{column}' missing from {file}")]
    MissingColumn { column: String, file: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
