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
//! `dcps-sizer` sizes a rectifier or battery charger either from flags
//! (`--family --vdc --idc --vpri`) or through an interactive wizard when no
//! sizing flag is given. Results print as an aligned human report by default
//! or as JSON with `--json`.

mod interactive;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use tracing::{debug, error};

use dcps_common::config::AppConfig;
use dcps_common::{logging, VersionInfo};
use dcps_sizing_engine::{calculate_with_options, io, EquipmentFamily, SizingError, SizingInput};

const SERVICE_NAME: &str = "dcps-sizer";

/// Exit codes mirrored by scripted callers; keep them stable.
const EXIT_OTHER: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_LOOKUP_GAP: u8 = 3;
const EXIT_TABLE_INTEGRITY: u8 = 4;

#[derive(Parser, Debug)]
#[command(
    name = "dcps-sizer",
    about = "Sizing calculator for rectifiers and stationary battery chargers",
    disable_version_flag = true
)]
struct Cli {
    /// Print extended version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    /// Equipment family to size
    #[arg(short, long, value_enum)]
    family: Option<FamilyArg>,

    /// Nominal DC output voltage (V)
    #[arg(long)]
    vdc: Option<f64>,

    /// Rated DC output current (A)
    #[arg(long)]
    idc: Option<f64>,

    /// Primary AC supply voltage (V)
    #[arg(long)]
    vpri: Option<f64>,

    /// Emit the result as JSON on stdout
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Attach per-field provenance to the result
    #[arg(long, action = ArgAction::SetTrue)]
    trace: bool,

    /// Path to a TOML config file (overrides the default search)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// CLI mirror of [`EquipmentFamily`] so clap can own the flag surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FamilyArg {
    /// Three-phase rectifier
    Rectifier,
    /// Single-phase battery charger
    #[value(name = "charger-1ph")]
    Charger1ph,
    /// Three-phase battery charger
    #[value(name = "charger-3ph")]
    Charger3ph,
}

impl From<FamilyArg> for EquipmentFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Rectifier => EquipmentFamily::Rectifier,
            FamilyArg::Charger1ph => EquipmentFamily::SinglePhaseCharger,
            FamilyArg::Charger3ph => EquipmentFamily::ThreePhaseCharger,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return ExitCode::SUCCESS;
    }

    let loaded = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_OTHER);
        }
    };

    if let Err(err) = logging::init_tracing(SERVICE_NAME, &loaded.config.logging) {
        eprintln!("warning: logging unavailable: {err:#}");
    }
    debug!(version = %VersionInfo::current().cli_string(), "dcps-sizer starting");
    if let Some(path) = &loaded.source {
        debug!("Configuration loaded from {}", path.display());
    }

    match run(&cli, &loaded.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Sizing run failed: {err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn load_config(cli: &Cli) -> Result<dcps_common::LoadedAppConfig> {
    match &cli.config {
        Some(path) => Ok(dcps_common::LoadedAppConfig {
            config: AppConfig::from_path(path.clone())?,
            source: Some(path.clone()),
        }),
        None => AppConfig::load_with_source(&AppConfig::default_candidates()),
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let input = match (cli.family, cli.vdc, cli.idc, cli.vpri) {
        (Some(family), Some(vdc), Some(idc), Some(vpri)) => {
            SizingInput::new(family.into(), vdc, idc, vpri)?
        }
        (None, None, None, None) => interactive::prompt_input()?,
        _ => {
            let mut cmd = Cli::command();
            cmd.error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "pass --family, --vdc, --idc and --vpri together, or none of them for the interactive wizard",
            )
            .exit()
        }
    };

    debug!(
        "Sizing {} at vdc={} idc={} vpri={}",
        input.family, input.vdc, input.idc, input.vpri
    );
    let record = calculate_with_options(&input, &config.margins, cli.trace)?;

    if cli.json {
        println!("{}", io::output_to_json(&record)?);
    } else {
        print!("{}", render::human_text(&record));
    }
    Ok(())
}

/// Map a failure to the documented process exit code.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SizingError>() {
        Some(SizingError::InvalidInput { .. }) => EXIT_INVALID_INPUT,
        Some(SizingError::LookupGap { .. }) => EXIT_LOOKUP_GAP,
        Some(SizingError::AmbiguousBand { .. }) => EXIT_TABLE_INTEGRITY,
        _ => EXIT_OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcps_sizing_engine::LookupAxis;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_a_full_sizing_request() {
        let cli = Cli::parse_from([
            "dcps-sizer",
            "--family",
            "charger-3ph",
            "--vdc",
            "600",
            "--idc",
            "600",
            "--vpri",
            "480",
            "--json",
        ]);
        assert_eq!(cli.family, Some(FamilyArg::Charger3ph));
        assert_eq!(cli.vdc, Some(600.0));
        assert!(cli.json);
        assert!(!cli.trace);
    }

    #[test]
    fn family_arg_maps_onto_engine_families() {
        assert_eq!(
            EquipmentFamily::from(FamilyArg::Rectifier),
            EquipmentFamily::Rectifier
        );
        assert_eq!(
            EquipmentFamily::from(FamilyArg::Charger1ph),
            EquipmentFamily::SinglePhaseCharger
        );
        assert_eq!(
            EquipmentFamily::from(FamilyArg::Charger3ph),
            EquipmentFamily::ThreePhaseCharger
        );
    }

    #[test]
    fn exit_codes_distinguish_engine_failures() {
        let invalid = anyhow::Error::from(SizingError::InvalidInput {
            field: "vdc",
            value: -1.0,
        });
        assert_eq!(exit_code_for(&invalid), EXIT_INVALID_INPUT);

        let gap = anyhow::Error::from(SizingError::LookupGap {
            table: "breaker_frames",
            axis: LookupAxis::Current,
            value: 9000.0,
        });
        assert_eq!(exit_code_for(&gap), EXIT_LOOKUP_GAP);

        let integrity = anyhow::Error::from(SizingError::AmbiguousBand {
            table: "conductors",
            reason: "bands overlap".into(),
        });
        assert_eq!(exit_code_for(&integrity), EXIT_TABLE_INTEGRITY);

        let other = anyhow::anyhow!("config unreadable");
        assert_eq!(exit_code_for(&other), EXIT_OTHER);
    }
}
