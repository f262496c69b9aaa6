//! Output writers: the Mantis dispense file and the plate review table.

pub mod instructions;
pub mod plate;

pub use instructions::{InstructionFormatter, InstrumentProfile};
pub use plate::write_plate_tsv;
