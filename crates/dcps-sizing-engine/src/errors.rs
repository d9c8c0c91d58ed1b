//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use thiserror::Error;

use crate::model::LookupAxis;

pub type Result<T> = std::result::Result<T, SizingError>;

#[derive(Debug, Error)]
pub enum SizingError {
    #[error("input field {field} is outside its valid range, got {value}")]
    InvalidInput { field: &'static str, value: f64 },
    #[error("{axis} value {value} is not covered by any band in table {table}")]
    LookupGap {
        table: &'static str,
        axis: LookupAxis,
        value: f64,
    },
    #[error("reference table {table} is inconsistent: {reason}")]
    AmbiguousBand { table: &'static str, reason: String },
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
