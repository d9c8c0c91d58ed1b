//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SizingError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EquipmentFamily {
    #[serde(rename = "rectifier")]
    Rectifier,
    #[serde(rename = "charger_1ph")]
    SinglePhaseCharger,
    #[serde(rename = "charger_3ph")]
    ThreePhaseCharger,
}

impl EquipmentFamily {
    pub fn all() -> [EquipmentFamily; 3] {
        [
            EquipmentFamily::Rectifier,
            EquipmentFamily::SinglePhaseCharger,
            EquipmentFamily::ThreePhaseCharger,
        ]
    }

    /// True for the families fed from a three-phase primary.
    pub fn is_three_phase_primary(&self) -> bool {
        matches!(
            self,
            EquipmentFamily::Rectifier | EquipmentFamily::ThreePhaseCharger
        )
    }
}

impl fmt::Display for EquipmentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EquipmentFamily::Rectifier => "Rectifier",
            EquipmentFamily::SinglePhaseCharger => "1PH Charger",
            EquipmentFamily::ThreePhaseCharger => "3PH Charger",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LookupAxis {
    #[serde(rename = "vdc")]
    Vdc,
    #[serde(rename = "idc")]
    Idc,
    #[serde(rename = "current")]
    Current,
}

impl fmt::Display for LookupAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupAxis::Vdc => "Vdc",
            LookupAxis::Idc => "Idc",
            LookupAxis::Current => "current",
        };
        f.write_str(label)
    }
}

/// One sizing request. Immutable once constructed; every electrical
/// field must be finite and positive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SizingInput {
    pub family: EquipmentFamily,
    /// Nominal DC output voltage in volts.
    pub vdc: f64,
    /// Rated DC output current in amps.
    pub idc: f64,
    /// Primary AC supply voltage in volts.
    pub vpri: f64,
}

impl SizingInput {
    pub fn new(family: EquipmentFamily, vdc: f64, idc: f64, vpri: f64) -> Result<Self> {
        let input = Self {
            family,
            vdc,
            idc,
            vpri,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("vdc", self.vdc)?;
        check_positive("idc", self.idc)?;
        check_positive("vpri", self.vpri)?;
        Ok(())
    }

    /// Rated DC output power in kilowatts.
    pub fn dc_power_kw(&self) -> f64 {
        self.vdc * self.idc / 1000.0
    }
}

/// Safety margins and site conditions applied on top of the nameplate
/// electrical inputs. Defaults reproduce the legacy sizing sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizingMargins {
    /// AC line voltage fluctuation allowance, as a fraction.
    #[serde(default = "default_line_fluctuation")]
    pub line_fluctuation: f64,
    /// Margin on the transformer secondary current, as a fraction.
    #[serde(default = "default_secondary_current_safety")]
    pub secondary_current_safety: f64,
    #[serde(default = "default_breaker_primary_safety")]
    pub breaker_primary_safety: f64,
    #[serde(default = "default_breaker_secondary_safety")]
    pub breaker_secondary_safety: f64,
    #[serde(default = "default_breaker_dc_safety")]
    pub breaker_dc_safety: f64,
    #[serde(default = "default_wire_primary_safety")]
    pub wire_primary_safety: f64,
    #[serde(default = "default_wire_secondary_safety")]
    pub wire_secondary_safety: f64,
    #[serde(default = "default_wire_dc_safety")]
    pub wire_dc_safety: f64,
    /// Ambient temperature outside the enclosure, degrees Celsius.
    #[serde(default = "default_ambient_temp_c")]
    pub ambient_temp_c: f64,
    /// Allowed temperature inside the enclosure, degrees Celsius.
    #[serde(default = "default_inside_temp_c")]
    pub inside_temp_c: f64,
    /// Margin on the required cooling airflow, as a fraction.
    #[serde(default = "default_airflow_safety")]
    pub airflow_safety: f64,
}

fn default_line_fluctuation() -> f64 {
    0.05
}

fn default_secondary_current_safety() -> f64 {
    0.20
}

fn default_breaker_primary_safety() -> f64 {
    0.30
}

fn default_breaker_secondary_safety() -> f64 {
    0.30
}

fn default_breaker_dc_safety() -> f64 {
    0.20
}

fn default_wire_primary_safety() -> f64 {
    0.15
}

fn default_wire_secondary_safety() -> f64 {
    0.10
}

fn default_wire_dc_safety() -> f64 {
    0.10
}

fn default_ambient_temp_c() -> f64 {
    40.0
}

fn default_inside_temp_c() -> f64 {
    55.0
}

fn default_airflow_safety() -> f64 {
    0.20
}

impl Default for SizingMargins {
    fn default() -> Self {
        Self {
            line_fluctuation: default_line_fluctuation(),
            secondary_current_safety: default_secondary_current_safety(),
            breaker_primary_safety: default_breaker_primary_safety(),
            breaker_secondary_safety: default_breaker_secondary_safety(),
            breaker_dc_safety: default_breaker_dc_safety(),
            wire_primary_safety: default_wire_primary_safety(),
            wire_secondary_safety: default_wire_secondary_safety(),
            wire_dc_safety: default_wire_dc_safety(),
            ambient_temp_c: default_ambient_temp_c(),
            inside_temp_c: default_inside_temp_c(),
            airflow_safety: default_airflow_safety(),
        }
    }
}

impl SizingMargins {
    pub fn validate(&self) -> Result<()> {
        check_fraction("line_fluctuation", self.line_fluctuation)?;
        check_fraction("secondary_current_safety", self.secondary_current_safety)?;
        check_fraction("breaker_primary_safety", self.breaker_primary_safety)?;
        check_fraction("breaker_secondary_safety", self.breaker_secondary_safety)?;
        check_fraction("breaker_dc_safety", self.breaker_dc_safety)?;
        check_fraction("wire_primary_safety", self.wire_primary_safety)?;
        check_fraction("wire_secondary_safety", self.wire_secondary_safety)?;
        check_fraction("wire_dc_safety", self.wire_dc_safety)?;
        check_fraction("airflow_safety", self.airflow_safety)?;
        if !self.ambient_temp_c.is_finite() || !self.inside_temp_c.is_finite() {
            return Err(SizingError::InvalidInput {
                field: "ambient_temp_c",
                value: self.ambient_temp_c,
            });
        }
        // The enclosure must run warmer than ambient or the airflow
        // equation divides by zero.
        if self.inside_temp_c <= self.ambient_temp_c {
            return Err(SizingError::InvalidInput {
                field: "inside_temp_c",
                value: self.inside_temp_c,
            });
        }
        Ok(())
    }

    /// Enclosure temperature rise over ambient, in degrees Fahrenheit.
    pub fn temp_rise_f(&self) -> f64 {
        (self.inside_temp_c - self.ambient_temp_c) * 1.8
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SizingError::InvalidInput { field, value });
    }
    Ok(())
}

fn check_fraction(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(SizingError::InvalidInput { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_rejects_non_positive_fields() {
        let err = SizingInput::new(EquipmentFamily::Rectifier, -10.0, 600.0, 480.0).unwrap_err();
        assert!(matches!(err, SizingError::InvalidInput { field: "vdc", .. }));

        let err = SizingInput::new(EquipmentFamily::Rectifier, 600.0, 0.0, 480.0).unwrap_err();
        assert!(matches!(err, SizingError::InvalidInput { field: "idc", .. }));

        let err =
            SizingInput::new(EquipmentFamily::Rectifier, 600.0, 600.0, f64::NAN).unwrap_err();
        assert!(matches!(err, SizingError::InvalidInput { field: "vpri", .. }));
    }

    #[test]
    fn margins_defaults_match_sizing_sheet() {
        let margins = SizingMargins::default();
        assert_eq!(margins.line_fluctuation, 0.05);
        assert_eq!(margins.secondary_current_safety, 0.20);
        assert_eq!(margins.breaker_dc_safety, 0.20);
        assert_eq!(margins.wire_primary_safety, 0.15);
        assert_eq!(margins.temp_rise_f(), 27.0);
        margins.validate().unwrap();
    }

    #[test]
    fn margins_reject_inverted_temperatures() {
        let margins = SizingMargins {
            inside_temp_c: 35.0,
            ..SizingMargins::default()
        };
        let err = margins.validate().unwrap_err();
        assert!(matches!(
            err,
            SizingError::InvalidInput {
                field: "inside_temp_c",
                ..
            }
        ));
    }

    #[test]
    fn margins_deserialize_with_partial_overrides() {
        let margins: SizingMargins = serde_json::from_str(r#"{"line_fluctuation": 0.1}"#).unwrap();
        assert_eq!(margins.line_fluctuation, 0.1);
        assert_eq!(margins.secondary_current_safety, 0.20);
    }
}
