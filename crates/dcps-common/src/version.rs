//! ---
//! dcps_section: "01-shared-runtime"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Shared primitives and utilities for the sizing tools."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use serde::Serialize;

/// Compile-time version metadata. Release pipelines stamp the build
/// environment; local builds report UNKNOWN for the optional fields.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Workspace semantic version.
    pub semver: String,
    /// Git commit hash captured at build time.
    pub git_sha: String,
    /// Build timestamp from the compilation environment.
    pub build_timestamp: String,
    /// Cargo profile used during compilation.
    pub profile: String,
}

impl VersionInfo {
    /// Construct a new [`VersionInfo`] instance using environment metadata.
    #[must_use]
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION").to_owned(),
            git_sha: option_env!("DCPS_GIT_SHA").unwrap_or("UNKNOWN").to_owned(),
            build_timestamp: option_env!("DCPS_BUILD_TIMESTAMP")
                .unwrap_or("UNKNOWN")
                .to_owned(),
            profile: option_env!("DCPS_BUILD_PROFILE")
                .unwrap_or("UNKNOWN")
                .to_owned(),
        }
    }

    /// Returns a concise CLI string combining semantic version and git hash.
    #[must_use]
    pub fn cli_string(&self) -> String {
        format!("{} ({})", self.semver, self.git_sha)
    }

    /// Human readable banner used in logging surfaces.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("DCPS-Sizer v{} (git {})", self.semver, self.git_sha)
    }

    /// Extended string containing build metadata suitable for `--version` flags.
    #[must_use]
    pub fn extended(&self) -> String {
        format!(
            "{banner}\nBuilt: {built}\nProfile: {profile}",
            banner = self.banner(),
            built = self.build_timestamp,
            profile = self.profile
        )
    }
}
