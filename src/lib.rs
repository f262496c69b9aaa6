//! dilution-plate - DNA dilution plates for the Mantis liquid handler
//!
//! Turns a long-form table of samples into:
//! - an 8×12 plate of diluent volumes for review
//! - a Mantis dispense file, with whole microlitres batched into high-volume
//!   chip tracks and the sub-microlitre remainder on the low-volume chip
//!
//! # Usage (Rust)
//!
//! ```
//! use dilution_plate::{DispensePipeline, PipelineConfig, SampleRecord};
//!
//! let pipeline = DispensePipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run(&[SampleRecord {
//!     well: "A1".into(),
//!     sample_id: "sample_1".into(),
//!     concentration: Some(24.4),
//!     ..SampleRecord::default()
//! }])?;
//! assert_eq!(output.document.track_count(), 1);
//! # Ok::<(), dilution_plate::PlateError>(())
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { plate_layout, dispense_instructions } from 'dilution-plate';
//! await init();
//! const plate = plate_layout(records, { input_volume: 1.0 });
//! const text = dispense_instructions(records, undefined);
//! ```

pub mod config;
pub mod dilution;
pub mod dispense;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod plate;
pub mod review;
pub mod sample_sheet;
pub mod tracks;
pub mod types;
pub mod well;

use wasm_bindgen::prelude::*;

pub use config::PipelineConfig;
pub use error::{PlateError, Result};
pub use pipeline::{DispensePipeline, PipelineOutput, RunSummary};
pub use types::*;
pub use well::WellCoordinate;

fn config_from_js(config: JsValue) -> std::result::Result<PipelineConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(PipelineConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {e}")))
}

fn run_from_js(
    records: JsValue,
    config: PipelineConfig,
) -> std::result::Result<PipelineOutput, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let records: Vec<SampleRecord> = serde_wasm_bindgen::from_value(records)
        .map_err(|e| JsValue::from_str(&format!("Invalid sample records: {e}")))?;

    DispensePipeline::new(config)
        .and_then(|pipeline| pipeline.run(&records))
        .map_err(JsValue::from)
}

/// Lay out sample records on the plate.
///
/// Returns `{ grid, summary, review }`: the 8×12 diluent grid, run totals and
/// the wells an operator should check.
///
/// # Errors
/// Returns an error for malformed records, wells or configuration.
#[wasm_bindgen]
pub fn plate_layout(records: JsValue, config: JsValue) -> std::result::Result<JsValue, JsValue> {
    let config = config_from_js(config)?;
    let output = run_from_js(records, config.clone())?;
    let occupied: Vec<WellCoordinate> = output.samples.iter().map(|s| s.well).collect();

    #[derive(serde::Serialize)]
    struct PlateLayout<'a> {
        grid: &'a PlateGrid,
        summary: RunSummary,
        review: Vec<review::WellReview>,
    }

    let layout = PlateLayout {
        grid: &output.grid,
        summary: output.summary(),
        review: review::review_plate(&output.grid, &occupied, &config),
    };
    serde_wasm_bindgen::to_value(&layout)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Build the Mantis dispense file for sample records.
///
/// # Errors
/// Returns an error for malformed records, wells or configuration.
#[wasm_bindgen]
pub fn dispense_instructions(
    records: JsValue,
    config: JsValue,
) -> std::result::Result<String, JsValue> {
    let config = config_from_js(config)?;
    run_from_js(records, config).map(|output| output.document.into_string())
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
