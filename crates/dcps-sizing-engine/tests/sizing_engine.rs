//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use std::thread;

use dcps_sizing_engine::{
    calculate, calculate_with_options, EquipmentFamily, ReferenceTables, SizingInput,
    SizingMargins,
};

#[test]
fn rectifier_full_record() {
    let record = calculate(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
    assert_eq!(record.kva, 484.0);
    assert_eq!(record.v_secondary_ln, 269.6);
    assert_eq!(record.v_secondary_ll, Some(467.0));
    assert_eq!(record.i_primary, 582.2);
    assert_eq!(record.i_secondary, 597.6);
    assert_eq!(record.breaker_primary_a, 800);
    assert_eq!(record.breaker_secondary_a, 800);
    assert_eq!(record.breaker_dc_a, 800);
    assert_eq!(record.wire_primary, "300MCM 2x");
    assert_eq!(record.wire_secondary, "300MCM 2x");
    assert_eq!(record.wire_dc, "300MCM 2x");
    assert_eq!(record.efficiency, 0.97);
    assert_eq!(record.heat_kw, 11.13);
    assert_eq!(record.heat_btu_per_hour, 37991.0);
    assert_eq!(record.required_cfm, 1564.0);
    assert!(record.trace.is_none());
}

#[test]
fn concurrent_calls_share_one_table_load() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                let record =
                    calculate(EquipmentFamily::ThreePhaseCharger, 600.0, 600.0, 480.0).unwrap();
                (record.kva, record.efficiency)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), (484.0, 0.94));
    }
    let tables = ReferenceTables::shared().unwrap();
    assert_eq!(tables.breaker_frames.len(), 34);
}

#[test]
fn traced_record_cites_only_matching_bands() {
    let input = SizingInput::new(EquipmentFamily::Rectifier, 48.0, 100.0, 208.0).unwrap();
    let record = calculate_with_options(&input, &SizingMargins::default(), true).unwrap();
    let trace = record.trace.expect("trace requested");

    let tables = ReferenceTables::shared().unwrap();
    let band = trace.for_field("v_secondary_ln").unwrap();
    assert_eq!(band.rows, vec!["rect-vband-boost".to_string()]);
    let cited = tables
        .rectifier_voltage_bands
        .iter()
        .find(|row| row.id == band.rows[0])
        .unwrap();
    assert!(input.vdc >= cited.lower_vdc && input.vdc < cited.upper_vdc);

    let efficiency = trace.for_field("efficiency").unwrap();
    let cited = tables
        .rectifier_efficiency
        .iter()
        .find(|row| row.id == efficiency.rows[0])
        .unwrap();
    assert!(input.vdc >= cited.lower_vdc && input.vdc < cited.upper_vdc);
    assert_eq!(record.efficiency, cited.efficiency);
}
