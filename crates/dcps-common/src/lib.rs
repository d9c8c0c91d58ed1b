//! ---
//! dcps_section: "01-shared-runtime"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Shared primitives and utilities for the sizing tools."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
//! Shared runtime pieces for the DCPS-Sizer workspace. This crate exposes
//! configuration loading, logging setup, and version metadata utilities
//! consumed by the operator-facing binaries.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{AppConfig, LoadedAppConfig, LoggingConfig};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
