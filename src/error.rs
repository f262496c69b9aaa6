//! Structured error types for dilution-plate.
//!
//! Volumes outside the dispensable range are deliberately *not* errors: the
//! dispense splitter masks them to zero so one bad well never aborts a plate.

/// All errors that can occur while building a plate or its dispense file.
#[derive(Debug, thiserror::Error)]
pub enum PlateError {
    /// Well label that does not decompose into a row A-H and a column 1-12.
    #[error("Malformed well label {label:?}: {reason}")]
    MalformedWellLabel { label: String, reason: String },

    /// Same well supplied twice while duplicates are rejected.
    #[error("Duplicate entry for well {well}")]
    DuplicateWell { well: String },

    /// Track capacity threshold that cannot bound a track.
    #[error("Track capacity threshold must be a positive number, got {0}")]
    CapacityThresholdMisconfigured(f64),

    /// Any other configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample record without a diluent volume or a concentration to derive it from.
    #[error("Well {well} has neither a diluent volume nor a concentration")]
    MissingVolume { well: String },

    /// Per-sample stock volume that is zero, negative or not finite.
    #[error("Well {well} has an invalid stock input volume {volume}")]
    InvalidInputVolume { well: String, volume: f64 },

    /// Sample sheet content that does not match the column mapping.
    #[error("Sample sheet: {0}")]
    SampleSheet(String),

    /// CSV reader error.
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    /// TOML configuration parse error.
    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlateError>;

impl PlateError {
    pub(crate) fn malformed_well(label: &str, reason: impl Into<String>) -> Self {
        Self::MalformedWellLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<PlateError> for wasm_bindgen::JsValue {
    fn from(e: PlateError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
