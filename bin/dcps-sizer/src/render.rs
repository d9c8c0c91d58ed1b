//! ---
//! dcps_section: "03-operator-shell"
//! dcps_subsection: "binary"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Operator-facing sizing CLI for DC power equipment."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
//!
//! Plain-text rendering of a sizing record for the terminal.

use std::fmt::{Display, Write};

use dcps_sizing_engine::OutputRecord;

/// Renders the aligned report shown when `--json` is not requested.
pub fn human_text(record: &OutputRecord) -> String {
    let mut out = String::new();
    let input = &record.input;
    let _ = writeln!(
        out,
        "{} sizing at {} V / {} A DC, {} V primary",
        input.family, input.vdc, input.idc, input.vpri
    );
    let _ = writeln!(out);

    push_line(&mut out, "Transformer rating", format_args!("{} kVA", record.kva));
    push_line(
        &mut out,
        "Secondary voltage L-N",
        format_args!("{} V", record.v_secondary_ln),
    );
    if let Some(v_ll) = record.v_secondary_ll {
        push_line(&mut out, "Secondary voltage L-L", format_args!("{v_ll} V"));
    }
    push_line(&mut out, "Primary current", format_args!("{} A", record.i_primary));
    push_line(
        &mut out,
        "Secondary current",
        format_args!("{} A", record.i_secondary),
    );
    let _ = writeln!(out);

    push_line(
        &mut out,
        "Primary breaker",
        format_args!("{} A frame", record.breaker_primary_a),
    );
    push_line(
        &mut out,
        "Secondary breaker",
        format_args!("{} A frame", record.breaker_secondary_a),
    );
    push_line(
        &mut out,
        "DC breaker",
        format_args!("{} A frame", record.breaker_dc_a),
    );
    push_line(&mut out, "Primary conductor", &record.wire_primary);
    push_line(&mut out, "Secondary conductor", &record.wire_secondary);
    push_line(&mut out, "DC conductor", &record.wire_dc);
    let _ = writeln!(out);

    push_line(&mut out, "Efficiency", record.efficiency);
    push_line(
        &mut out,
        "Heat dissipation",
        format_args!(
            "{} kW ({} BTU/h)",
            record.heat_kw, record.heat_btu_per_hour
        ),
    );
    push_line(
        &mut out,
        "Required airflow",
        format_args!("{} CFM", record.required_cfm),
    );

    if let Some(trace) = &record.trace {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Trace");
        for field in &trace.fields {
            if field.rows.is_empty() {
                let _ = writeln!(out, "    {} <- {}", field.field, field.rule);
            } else {
                let _ = writeln!(
                    out,
                    "    {} <- {} [{}]",
                    field.field,
                    field.rule,
                    field.rows.join(", ")
                );
            }
        }
    }
    out
}

fn push_line(out: &mut String, label: &str, value: impl Display) {
    let _ = writeln!(out, "  {label:<24}{value}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcps_sizing_engine::{
        calculate, calculate_with_options, EquipmentFamily, SizingInput, SizingMargins,
    };

    #[test]
    fn rectifier_report_shows_all_sections() {
        let record = calculate(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        let text = human_text(&record);
        assert!(text.starts_with("Rectifier sizing at 600 V / 600 A DC, 480 V primary"));
        assert!(text.contains("Transformer rating      484 kVA"));
        assert!(text.contains("Secondary voltage L-L"));
        assert!(text.contains("800 A frame"));
        assert!(text.contains("300MCM 2x"));
        assert!(text.contains("Heat dissipation        11.13 kW (37991 BTU/h)"));
        assert!(text.contains("Required airflow        1564 CFM"));
        assert!(!text.contains("Trace"));
    }

    #[test]
    fn single_phase_report_omits_line_to_line_voltage() {
        let record = calculate(EquipmentFamily::SinglePhaseCharger, 130.0, 50.0, 240.0).unwrap();
        let text = human_text(&record);
        assert!(text.contains("Secondary voltage L-N"));
        assert!(!text.contains("Secondary voltage L-L"));
    }

    #[test]
    fn traced_report_lists_rules_and_rows() {
        let input = SizingInput::new(EquipmentFamily::Rectifier, 600.0, 600.0, 480.0).unwrap();
        let record = calculate_with_options(&input, &SizingMargins::default(), true).unwrap();
        let text = human_text(&record);
        assert!(text.contains("  Trace"));
        assert!(text.contains("efficiency <- efficiency_band [rect-eff-300-1500]"));
        assert!(text.contains("kva <- kva_frame"));
    }
}
