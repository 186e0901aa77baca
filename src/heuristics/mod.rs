// src/heuristics/mod.rs

mod ratecon;

use serde::Deserialize;
use serde::Serialize;

pub const UNKNOWN_REFERENCE: &str = "Unknown";
pub const DEFAULT_RATE: &str = "0.00";
pub const DEFAULT_EQUIPMENT: &str = "None";

/// The handful of fields we pull out of a rate confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConFields {
    pub reference: String,
    /// Rate as printed, thousands separators removed.
    pub rate: String,
    pub equipment: String,
    pub container: String,
}

impl Default for RateConFields {
    fn default() -> Self {
        Self {
            reference: UNKNOWN_REFERENCE.to_string(),
            rate: DEFAULT_RATE.to_string(),
            equipment: DEFAULT_EQUIPMENT.to_string(),
            container: String::new(),
        }
    }
}

impl RateConFields {
    /// A document without a reference number is not a layout we recognise.
    pub fn is_supported(&self) -> bool {
        self.reference != UNKNOWN_REFERENCE
    }

    /// How many fields were actually found in the text (as opposed to defaulted).
    pub fn coverage(&self) -> (usize, usize) {
        let total = 4;
        let filled = [
            self.reference != UNKNOWN_REFERENCE,
            self.rate != DEFAULT_RATE,
            self.equipment != DEFAULT_EQUIPMENT,
            !self.container.is_empty(),
        ]
        .iter()
        .filter(|&&v| v)
        .count();
        (filled, total)
    }
}

/// Extract rate confirmation fields from raw PDF text.
pub fn extract_ratecon(text: &str) -> RateConFields {
    ratecon::extract(text)
}
