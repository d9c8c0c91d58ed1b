//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
//! Numeric policy shared by every family. The rounding here must match
//! the legacy sheet's cell formatting exactly or parity breaks.

/// Smallest multiple of `significance` that is >= `value`.
/// `significance` must be positive.
pub fn ceiling(value: f64, significance: f64) -> f64 {
    (value / significance).ceil() * significance
}

/// Rounds half away from zero at `decimals` places, like spreadsheet ROUND.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Snaps a raw kVA figure to the next catalogue frame. Small units use
/// quarter-kVA frames, mid-range units half-kVA, everything else whole kVA.
pub fn frame_kva(raw: f64) -> f64 {
    let significance = if raw < 10.0 {
        0.25
    } else if raw < 20.0 {
        0.5
    } else {
        1.0
    };
    ceiling(raw, significance)
}

/// Applies the per-field rounding policy. Currents and voltages carry one
/// decimal, heat terms follow their reporting units, kVA is framed, and
/// efficiency stays a bare table constant.
pub fn round_field(field: &str, raw: f64) -> f64 {
    match field {
        "kva" => frame_kva(raw),
        "efficiency" => raw,
        "heat_kw" => round_half_up(raw, 2),
        "heat_btu_per_hour" | "required_cfm" => round_half_up(raw, 0),
        _ => round_half_up(raw, 1),
    }
}
