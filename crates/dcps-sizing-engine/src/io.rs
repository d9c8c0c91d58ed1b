//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use crate::{errors::Result, model::SizingInput, trace::OutputRecord};

/// Parses a sizing request from JSON and checks its invariants.
pub fn input_from_json(data: &str) -> Result<SizingInput> {
    let input: SizingInput = serde_json::from_str(data)?;
    input.validate()?;
    Ok(input)
}

/// Serializes a finished record for machine consumers.
pub fn output_to_json(record: &OutputRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}
