//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::{
    evaluate::RuleResult,
    model::SizingInput,
    rounding::round_field,
};

/// Which table row(s) and rule produced one output field. Row ids are
/// the stable identifiers carried by the reference tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldProvenance {
    pub field: String,
    pub rule: String,
    pub rows: Vec<String>,
}

impl FieldProvenance {
    pub fn new(field: &str, rule: &str, rows: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            rows,
        }
    }
}

/// Audit view of one calculation, attached to the output on request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceReport {
    pub fields: Vec<FieldProvenance>,
}

impl TraceReport {
    pub fn for_field(&self, field: &str) -> Option<&FieldProvenance> {
        self.fields.iter().find(|entry| entry.field == field)
    }

    /// All distinct row ids consulted, in first-use order.
    pub fn consulted_rows(&self) -> Vec<&str> {
        let mut rows: Vec<&str> = Vec::new();
        for entry in &self.fields {
            for row in &entry.rows {
                if !rows.contains(&row.as_str()) {
                    rows.push(row);
                }
            }
        }
        rows
    }
}

/// Final sizing result with display rounding applied. The trace is only
/// populated when the caller asked for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputRecord {
    pub input: SizingInput,
    pub kva: f64,
    pub v_secondary_ln: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_secondary_ll: Option<f64>,
    pub i_primary: f64,
    pub i_secondary: f64,
    pub breaker_primary_a: u32,
    pub breaker_secondary_a: u32,
    pub breaker_dc_a: u32,
    pub wire_primary: String,
    pub wire_secondary: String,
    pub wire_dc: String,
    pub efficiency: f64,
    pub heat_kw: f64,
    pub heat_btu_per_hour: f64,
    pub required_cfm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceReport>,
}

/// Merges evaluator output with the rounding policy into the final record.
/// Pure assembly, no failure modes.
pub fn build_output(result: RuleResult, input: &SizingInput, debug: bool) -> OutputRecord {
    let RuleResult {
        family: _,
        kva,
        v_secondary_ln,
        v_secondary_ll,
        i_primary,
        i_secondary,
        efficiency,
        heat_kw,
        heat_btu_per_hour,
        required_cfm,
        breaker_primary_a,
        breaker_secondary_a,
        breaker_dc_a,
        wire_primary,
        wire_secondary,
        wire_dc,
        provenance,
    } = result;

    let trace = if debug {
        Some(TraceReport { fields: provenance })
    } else {
        None
    };

    OutputRecord {
        input: *input,
        kva: round_field("kva", kva),
        v_secondary_ln: round_field("v_secondary_ln", v_secondary_ln),
        v_secondary_ll: v_secondary_ll.map(|v| round_field("v_secondary_ll", v)),
        i_primary: round_field("i_primary", i_primary),
        i_secondary: round_field("i_secondary", i_secondary),
        breaker_primary_a,
        breaker_secondary_a,
        breaker_dc_a,
        wire_primary,
        wire_secondary,
        wire_dc,
        efficiency: round_field("efficiency", efficiency),
        heat_kw: round_field("heat_kw", heat_kw),
        heat_btu_per_hour: round_field("heat_btu_per_hour", heat_btu_per_hour),
        required_cfm: round_field("required_cfm", required_cfm),
        trace,
    }
}
