use super::{DEFAULT_EQUIPMENT, DEFAULT_RATE, RateConFields, UNKNOWN_REFERENCE};
use regex::Regex;

// Known layouts label the same field differently; earlier labels win.
const REFERENCE_PATTERNS: &[&str] = &[
    r"Route #\s*(\S+)",
    r"Reference #\s*(\S+)",
    r"Pro #\s*(\S+)",
    r"Load #\s*(\S+)",
    r"Job #\s*(\S+)",
];

const RATE_PATTERNS: &[&str] = &[
    r"Total Rate:\s*\$?([\d,]+\.?\d{0,2})",
    r"Total Cost\s*\$?([\d,]+\.?\d{0,2})",
    r"Amount:\s*\$?([\d,]+\.?\d{0,2})",
    r"Rate:\s*\$?([\d,]+\.?\d{0,2})",
];

const EQUIPMENT_PATTERNS: &[&str] = &[
    r"Equipment:\s*([^\n]+)",
    r"Trailer Type:\s*([^\n]+)",
    r"Equipment Type:\s*([^\n]+)",
];

const CONTAINER_PATTERNS: &[&str] = &[
    r"Container #:\s*(\S+)",
    r"Container Number:\s*(\S+)",
    r"Container ID:\s*(\S+)",
];

/// Main extraction entry point — first matching label per field, case-insensitive.
pub fn extract(text: &str) -> RateConFields {
    RateConFields {
        reference: find_match(REFERENCE_PATTERNS, text)
            .unwrap_or_else(|| UNKNOWN_REFERENCE.to_string()),
        rate: find_match(RATE_PATTERNS, text)
            .map(|r| r.replace(',', ""))
            .unwrap_or_else(|| DEFAULT_RATE.to_string()),
        equipment: find_match(EQUIPMENT_PATTERNS, text)
            .unwrap_or_else(|| DEFAULT_EQUIPMENT.to_string()),
        container: find_match(CONTAINER_PATTERNS, text).unwrap_or_default(),
    }
}

/// First label that matches decides the field; a blank value counts as not found.
fn find_match(patterns: &[&str], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|pattern| {
            let re = Regex::new(&format!("(?i){pattern}")).ok()?;
            re.captures(text).map(|c| c[1].trim().to_string())
        })
        .filter(|value| !value.is_empty())
}
