//! Data types for plate layouts and dispense plans.

mod dispense;
mod document;
mod plate;
mod sample;

pub use dispense::*;
pub use document::*;
pub use plate::*;
pub use sample::*;
