use std::fmt;

use serde::{Deserialize, Serialize};

/// Default file name for a downloaded dispense file.
pub const DEFAULT_INSTRUCTION_FILE_NAME: &str = "mantis.dilution.dl.txt";

/// A finished dispense-instruction file. Built once by the writer and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionDocument {
    text: String,
    track_count: usize,
}

impl InstructionDocument {
    pub(crate) fn new(text: String, track_count: usize) -> Self {
        Self { text, track_count }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Number of high-volume tracks in the file.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.track_count
    }
}

impl fmt::Display for InstructionDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
