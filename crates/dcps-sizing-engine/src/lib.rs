//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
//! Deterministic sizing calculator for rectifiers and stationary battery
//! chargers. Reference tables are loaded once and shared read-only, so
//! calculations are safe to run concurrently. All numeric behavior is
//! pinned to the legacy sizing sheet by parity tests.
pub mod errors;
pub mod evaluate;
pub mod io;
pub mod model;
pub mod rounding;
pub mod tables;
pub mod trace;

pub use errors::{Result, SizingError};
pub use evaluate::RuleResult;
pub use model::{EquipmentFamily, LookupAxis, SizingInput, SizingMargins};
pub use tables::ReferenceTables;
pub use trace::{build_output, FieldProvenance, OutputRecord, TraceReport};

/// Sizes one unit with the default margins and no trace attached.
pub fn calculate(
    family: EquipmentFamily,
    vdc: f64,
    idc: f64,
    vpri: f64,
) -> Result<OutputRecord> {
    let input = SizingInput::new(family, vdc, idc, vpri)?;
    calculate_with_options(&input, &SizingMargins::default(), false)
}

/// Sizes one unit with explicit margins. When `debug` is set the record
/// carries the full audit trace of consulted rows and rules.
pub fn calculate_with_options(
    input: &SizingInput,
    margins: &SizingMargins,
    debug: bool,
) -> Result<OutputRecord> {
    let tables = ReferenceTables::shared()?;
    let rule_result = evaluate::evaluate(input, margins, tables)?;
    Ok(build_output(rule_result, input, debug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_is_deterministic() {
        let first = calculate(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        let second = calculate(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn invalid_input_is_rejected_before_evaluation() {
        let err = calculate(EquipmentFamily::Rectifier, -10.0, 600.0, 480.0).unwrap_err();
        assert!(matches!(err, SizingError::InvalidInput { field: "vdc", .. }));
    }

    #[test]
    fn trace_is_attached_only_on_request() {
        let input =
            SizingInput::new(EquipmentFamily::SinglePhaseCharger, 130.0, 50.0, 240.0).unwrap();
        let margins = SizingMargins::default();
        let plain = calculate_with_options(&input, &margins, false).unwrap();
        let traced = calculate_with_options(&input, &margins, true).unwrap();
        assert!(plain.trace.is_none());
        let trace = traced.trace.expect("trace requested");
        assert!(trace.for_field("kva").is_some());
        assert!(trace.consulted_rows().contains(&"chg1-eff-v100-i50"));
    }

    #[test]
    fn traced_and_plain_records_agree_on_values() {
        let input =
            SizingInput::new(EquipmentFamily::ThreePhaseCharger, 600.0, 600.0, 480.0).unwrap();
        let margins = SizingMargins::default();
        let plain = calculate_with_options(&input, &margins, false).unwrap();
        let mut traced = calculate_with_options(&input, &margins, true).unwrap();
        traced.trace = None;
        assert_eq!(plain, traced);
    }
}
