//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
//! Piecewise rule evaluation. One formula implementation per equipment
//! family, all feeding the same raw result shape. Formula structure and
//! coefficient values reproduce the legacy sizing sheet.
use tracing::debug;

use crate::{
    errors::Result,
    model::{EquipmentFamily, SizingInput, SizingMargins},
    rounding::frame_kva,
    tables::{ReferenceTables, VoltageBandRow},
    trace::FieldProvenance,
};

/// BTU per hour carried by one kilowatt of heat.
const BTU_PER_HOUR_PER_KW: f64 = 3412.142;

/// Airflow in CFM needed per watt of heat per degree Fahrenheit of rise.
const CFM_PER_WATT_PER_DEG_F: f64 = 3.16;

/// Six-pulse bridge commutation factor between DC output current and
/// transformer secondary line current.
const SECONDARY_CURRENT_FACTOR_3PH: f64 = 0.83;

/// Single-phase form factor between DC output current and RMS secondary
/// current.
const SECONDARY_CURRENT_FACTOR_1PH: f64 = 1.11;

/// Raw evaluator output. The kVA figure is already snapped to a catalogue
/// frame because the primary current derives from the framed rating, as
/// the legacy sheet does. Everything else is pre-rounding.
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub family: EquipmentFamily,
    pub kva: f64,
    pub v_secondary_ln: f64,
    pub v_secondary_ll: Option<f64>,
    pub i_primary: f64,
    pub i_secondary: f64,
    pub efficiency: f64,
    pub heat_kw: f64,
    pub heat_btu_per_hour: f64,
    pub required_cfm: f64,
    pub breaker_primary_a: u32,
    pub breaker_secondary_a: u32,
    pub breaker_dc_a: u32,
    pub wire_primary: String,
    pub wire_secondary: String,
    pub wire_dc: String,
    pub provenance: Vec<FieldProvenance>,
}

/// Dispatches to the family formula after checking input invariants.
pub fn evaluate(
    input: &SizingInput,
    margins: &SizingMargins,
    tables: &ReferenceTables,
) -> Result<RuleResult> {
    input.validate()?;
    margins.validate()?;
    let result = match input.family {
        EquipmentFamily::Rectifier => evaluate_rectifier(input, margins, tables),
        EquipmentFamily::SinglePhaseCharger => evaluate_charger_1ph(input, margins, tables),
        EquipmentFamily::ThreePhaseCharger => evaluate_charger_3ph(input, margins, tables),
    }?;
    debug!(
        "{} evaluated: {} kVA, primary {:.1} A",
        input.family, result.kva, result.i_primary
    );
    Ok(result)
}

fn evaluate_rectifier(
    input: &SizingInput,
    margins: &SizingMargins,
    tables: &ReferenceTables,
) -> Result<RuleResult> {
    let band = tables.rectifier_voltage_band(input.vdc)?;
    let efficiency_row = tables.rectifier_efficiency(input.vdc)?;
    three_phase_transformer(
        input,
        margins,
        tables,
        band,
        efficiency_row.efficiency,
        efficiency_row.id,
    )
}

fn evaluate_charger_3ph(
    input: &SizingInput,
    margins: &SizingMargins,
    tables: &ReferenceTables,
) -> Result<RuleResult> {
    let band = tables.charger_3ph_voltage_band(input.vdc)?;
    let efficiency_row = tables.charger_3ph_efficiency(input.vdc, input.idc)?;
    three_phase_transformer(
        input,
        margins,
        tables,
        band,
        efficiency_row.efficiency,
        efficiency_row.id,
    )
}

/// Shared derivation for the families fed from a three-phase primary.
/// The rectifier and the 3PH charger differ only in their voltage band
/// table and efficiency source.
fn three_phase_transformer(
    input: &SizingInput,
    margins: &SizingMargins,
    tables: &ReferenceTables,
    band: &VoltageBandRow,
    efficiency: f64,
    efficiency_row_id: &str,
) -> Result<RuleResult> {
    let sqrt3 = 3.0_f64.sqrt();
    let line_factor = 1.0 + margins.line_fluctuation;

    let v_secondary_ln = band.secondary_factor * line_factor * input.vdc + band.boost_v;
    let v_secondary_ll = sqrt3 * v_secondary_ln;
    let i_secondary = (1.0 + margins.secondary_current_safety)
        * input.idc
        * SECONDARY_CURRENT_FACTOR_3PH;
    let kva = frame_kva(3.0 * v_secondary_ln * i_secondary / 1000.0);
    let i_primary = kva * 1000.0 / input.vpri / sqrt3;

    let mut provenance = vec![
        FieldProvenance::new(
            "v_secondary_ln",
            "secondary_voltage_band",
            vec![band.id.to_string()],
        ),
        FieldProvenance::new(
            "v_secondary_ll",
            "secondary_voltage_band",
            vec![band.id.to_string()],
        ),
        FieldProvenance::new("i_secondary", "secondary_current_margin", Vec::new()),
        FieldProvenance::new("kva", "kva_frame", Vec::new()),
        FieldProvenance::new("i_primary", "primary_current_from_kva", Vec::new()),
    ];

    let tail = common_tail(
        input,
        margins,
        tables,
        i_primary,
        i_secondary,
        efficiency,
        efficiency_row_id,
    )?;
    provenance.extend(tail.provenance);

    Ok(RuleResult {
        family: input.family,
        kva,
        v_secondary_ln,
        v_secondary_ll: Some(v_secondary_ll),
        i_primary,
        i_secondary,
        efficiency: tail.efficiency,
        heat_kw: tail.heat_kw,
        heat_btu_per_hour: tail.heat_btu_per_hour,
        required_cfm: tail.required_cfm,
        breaker_primary_a: tail.breaker_primary_a,
        breaker_secondary_a: tail.breaker_secondary_a,
        breaker_dc_a: tail.breaker_dc_a,
        wire_primary: tail.wire_primary,
        wire_secondary: tail.wire_secondary,
        wire_dc: tail.wire_dc,
        provenance,
    })
}

/// Single-phase chargers use an isolation transformer wound for the
/// battery voltage, so the secondary reports the DC setpoint directly
/// and there is no line-line figure.
fn evaluate_charger_1ph(
    input: &SizingInput,
    margins: &SizingMargins,
    tables: &ReferenceTables,
) -> Result<RuleResult> {
    let efficiency_row = tables.charger_1ph_efficiency(input.vdc, input.idc)?;
    let line_factor = 1.0 + margins.line_fluctuation;

    let v_secondary_ln = input.vdc;
    let i_secondary = SECONDARY_CURRENT_FACTOR_1PH * line_factor * input.idc;
    let kva = frame_kva(input.vdc * i_secondary / 1000.0);
    let i_primary = kva * 1000.0 / input.vpri;

    let mut provenance = vec![
        FieldProvenance::new("v_secondary_ln", "secondary_tracks_battery", Vec::new()),
        FieldProvenance::new("i_secondary", "secondary_current_margin", Vec::new()),
        FieldProvenance::new("kva", "kva_frame", Vec::new()),
        FieldProvenance::new("i_primary", "primary_current_from_kva", Vec::new()),
    ];

    let tail = common_tail(
        input,
        margins,
        tables,
        i_primary,
        i_secondary,
        efficiency_row.efficiency,
        efficiency_row.id,
    )?;
    provenance.extend(tail.provenance);

    Ok(RuleResult {
        family: input.family,
        kva,
        v_secondary_ln,
        v_secondary_ll: None,
        i_primary,
        i_secondary,
        efficiency: tail.efficiency,
        heat_kw: tail.heat_kw,
        heat_btu_per_hour: tail.heat_btu_per_hour,
        required_cfm: tail.required_cfm,
        breaker_primary_a: tail.breaker_primary_a,
        breaker_secondary_a: tail.breaker_secondary_a,
        breaker_dc_a: tail.breaker_dc_a,
        wire_primary: tail.wire_primary,
        wire_secondary: tail.wire_secondary,
        wire_dc: tail.wire_dc,
        provenance,
    })
}

struct CommonTail {
    efficiency: f64,
    heat_kw: f64,
    heat_btu_per_hour: f64,
    required_cfm: f64,
    breaker_primary_a: u32,
    breaker_secondary_a: u32,
    breaker_dc_a: u32,
    wire_primary: String,
    wire_secondary: String,
    wire_dc: String,
    provenance: Vec<FieldProvenance>,
}

/// Protection, conductor, and thermal outputs shared by every family.
/// Selections are driven by the raw currents with each circuit's own
/// safety margin applied.
fn common_tail(
    input: &SizingInput,
    margins: &SizingMargins,
    tables: &ReferenceTables,
    i_primary: f64,
    i_secondary: f64,
    efficiency: f64,
    efficiency_row_id: &str,
) -> Result<CommonTail> {
    let breaker_primary =
        tables.breaker_frame((1.0 + margins.breaker_primary_safety) * i_primary)?;
    let breaker_secondary =
        tables.breaker_frame((1.0 + margins.breaker_secondary_safety) * i_secondary)?;
    let breaker_dc = tables.breaker_frame((1.0 + margins.breaker_dc_safety) * input.idc)?;

    let wire_primary = tables.conductor((1.0 + margins.wire_primary_safety) * i_primary)?;
    let wire_secondary = tables.conductor((1.0 + margins.wire_secondary_safety) * i_secondary)?;
    let wire_dc = tables.conductor((1.0 + margins.wire_dc_safety) * input.idc)?;

    let heat_kw = input.dc_power_kw() * (1.0 - efficiency) / efficiency;
    let heat_btu_per_hour = heat_kw * BTU_PER_HOUR_PER_KW;
    let required_cfm = CFM_PER_WATT_PER_DEG_F * (heat_kw * 1000.0) / margins.temp_rise_f()
        * (1.0 + margins.airflow_safety);

    let provenance = vec![
        FieldProvenance::new(
            "efficiency",
            "efficiency_band",
            vec![efficiency_row_id.to_string()],
        ),
        FieldProvenance::new(
            "heat_kw",
            "heat_from_efficiency",
            vec![efficiency_row_id.to_string()],
        ),
        FieldProvenance::new("heat_btu_per_hour", "btu_conversion", Vec::new()),
        FieldProvenance::new("required_cfm", "airflow_requirement", Vec::new()),
        FieldProvenance::new(
            "breaker_primary_a",
            "breaker_frame_selection",
            vec![breaker_primary.id.to_string()],
        ),
        FieldProvenance::new(
            "breaker_secondary_a",
            "breaker_frame_selection",
            vec![breaker_secondary.id.to_string()],
        ),
        FieldProvenance::new(
            "breaker_dc_a",
            "breaker_frame_selection",
            vec![breaker_dc.id.to_string()],
        ),
        FieldProvenance::new(
            "wire_primary",
            "conductor_selection",
            vec![wire_primary.id.to_string()],
        ),
        FieldProvenance::new(
            "wire_secondary",
            "conductor_selection",
            vec![wire_secondary.id.to_string()],
        ),
        FieldProvenance::new(
            "wire_dc",
            "conductor_selection",
            vec![wire_dc.id.to_string()],
        ),
    ];

    Ok(CommonTail {
        efficiency,
        heat_kw,
        heat_btu_per_hour,
        required_cfm,
        breaker_primary_a: breaker_primary.frame_a,
        breaker_secondary_a: breaker_secondary.frame_a,
        breaker_dc_a: breaker_dc.frame_a,
        wire_primary: wire_primary.size.to_string(),
        wire_secondary: wire_secondary.size.to_string(),
        wire_dc: wire_dc.size.to_string(),
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SizingError;
    use crate::model::LookupAxis;

    fn tables() -> ReferenceTables {
        ReferenceTables::builtin()
    }

    #[test]
    fn rectifier_low_voltage_gets_secondary_boost() {
        let input =
            SizingInput::new(EquipmentFamily::Rectifier, 48.0, 100.0, 208.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        assert!((result.v_secondary_ln - 23.5712).abs() < 1e-9);
        assert_eq!(result.kva, 7.25);
    }

    #[test]
    fn rectifier_above_boost_threshold_has_no_offset() {
        let input =
            SizingInput::new(EquipmentFamily::Rectifier, 85.0, 100.0, 208.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        // 0.428 * 1.05 * 85, no boost term.
        assert!((result.v_secondary_ln - 38.199).abs() < 1e-9);
    }

    #[test]
    fn charger_3ph_boost_threshold_sits_at_87_volts() {
        let margins = SizingMargins::default();
        let at_86 = SizingInput::new(EquipmentFamily::ThreePhaseCharger, 86.0, 100.0, 208.0)
            .unwrap();
        let at_87 = SizingInput::new(EquipmentFamily::ThreePhaseCharger, 87.0, 100.0, 208.0)
            .unwrap();
        let boosted = evaluate(&at_86, &margins, &tables()).unwrap();
        let unboosted = evaluate(&at_87, &margins, &tables()).unwrap();
        assert!((boosted.v_secondary_ln - (0.428 * 1.05 * 86.0 + 2.0)).abs() < 1e-9);
        assert!((unboosted.v_secondary_ln - 0.428 * 1.05 * 87.0).abs() < 1e-9);
    }

    #[test]
    fn primary_current_derives_from_framed_kva() {
        let input =
            SizingInput::new(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        assert_eq!(result.kva, 484.0);
        let expected = 484.0 * 1000.0 / 480.0 / 3.0_f64.sqrt();
        assert!((result.i_primary - expected).abs() < 1e-9);
    }

    #[test]
    fn single_phase_charger_has_no_line_line_voltage() {
        let input =
            SizingInput::new(EquipmentFamily::SinglePhaseCharger, 130.0, 50.0, 240.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        assert_eq!(result.v_secondary_ln, 130.0);
        assert_eq!(result.v_secondary_ll, None);
        assert_eq!(result.kva, 7.75);
        assert!((result.i_secondary - 58.275).abs() < 1e-9);
    }

    #[test]
    fn selections_use_unrounded_currents() {
        let input =
            SizingInput::new(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        assert_eq!(result.breaker_primary_a, 800);
        assert_eq!(result.breaker_secondary_a, 800);
        assert_eq!(result.breaker_dc_a, 800);
        assert_eq!(result.wire_primary, "300MCM 2x");
        assert_eq!(result.wire_secondary, "300MCM 2x");
        assert_eq!(result.wire_dc, "300MCM 2x");
    }

    #[test]
    fn out_of_range_voltage_reports_lookup_gap() {
        let input =
            SizingInput::new(EquipmentFamily::Rectifier, 1e9, 600.0, 480.0).unwrap();
        let err = evaluate(&input, &SizingMargins::default(), &tables()).unwrap_err();
        assert!(matches!(
            err,
            SizingError::LookupGap {
                axis: LookupAxis::Vdc,
                ..
            }
        ));
    }

    #[test]
    fn every_field_carries_a_provenance_entry() {
        let input =
            SizingInput::new(EquipmentFamily::ThreePhaseCharger, 600.0, 600.0, 480.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        for field in [
            "v_secondary_ln",
            "v_secondary_ll",
            "i_secondary",
            "kva",
            "i_primary",
            "efficiency",
            "heat_kw",
            "heat_btu_per_hour",
            "required_cfm",
            "breaker_primary_a",
            "breaker_secondary_a",
            "breaker_dc_a",
            "wire_primary",
            "wire_secondary",
            "wire_dc",
        ] {
            assert!(
                result.provenance.iter().any(|entry| entry.field == field),
                "missing provenance for {field}"
            );
        }
    }

    #[test]
    fn provenance_cites_the_rows_that_matched() {
        let input =
            SizingInput::new(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        let result = evaluate(&input, &SizingMargins::default(), &tables()).unwrap();
        let band = result
            .provenance
            .iter()
            .find(|entry| entry.field == "v_secondary_ln")
            .unwrap();
        assert_eq!(band.rows, vec!["rect-vband-std".to_string()]);
        let eff = result
            .provenance
            .iter()
            .find(|entry| entry.field == "efficiency")
            .unwrap();
        assert_eq!(eff.rows, vec!["rect-eff-300-1500".to_string()]);
        let breaker = result
            .provenance
            .iter()
            .find(|entry| entry.field == "breaker_dc_a")
            .unwrap();
        assert_eq!(breaker.rows, vec!["cb-800".to_string()]);
    }
}
