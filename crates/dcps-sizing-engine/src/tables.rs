//! ---
//! dcps_section: "02-sizing-engine"
//! dcps_subsection: "module"
//! dcps_type: "source"
//! dcps_scope: "code"
//! dcps_description: "Sizing rules and equipment selection for DC power systems."
//! dcps_version: "v0.0.0-prealpha"
//! dcps_owner: "tbd"
//! ---
use once_cell::sync::OnceCell;
use tracing::info;

use crate::{
    errors::{Result, SizingError},
    model::LookupAxis,
};

/// Secondary-voltage derivation band for transformer-coupled families.
/// Low DC voltages get a fixed boost on top of the linear factor.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageBandRow {
    pub id: &'static str,
    pub lower_vdc: f64,
    pub upper_vdc: f64,
    pub secondary_factor: f64,
    pub boost_v: f64,
}

/// Conversion efficiency band keyed by DC voltage alone.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyRow {
    pub id: &'static str,
    pub lower_vdc: f64,
    pub upper_vdc: f64,
    pub efficiency: f64,
}

/// Conversion efficiency cell keyed jointly by DC voltage and current.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargerEfficiencyRow {
    pub id: &'static str,
    pub lower_vdc: f64,
    pub upper_vdc: f64,
    pub lower_idc: f64,
    pub upper_idc: f64,
    pub efficiency: f64,
}

/// Standard circuit-breaker frame selection band keyed by amps.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerRow {
    pub id: &'static str,
    pub lower_a: f64,
    pub upper_a: f64,
    pub frame_a: u32,
}

/// Conductor size selection band keyed by amps.
#[derive(Debug, Clone, PartialEq)]
pub struct ConductorRow {
    pub id: &'static str,
    pub lower_a: f64,
    pub upper_a: f64,
    pub size: &'static str,
}

// Band edges are [lower, upper): a value equal to an edge belongs to
// the band that edge opens, matching the legacy sheet's approximate-
// match lookups.

const RECTIFIER_VOLTAGE_BANDS: &[(&str, f64, f64, f64, f64)] = &[
    ("rect-vband-boost", 10.0, 85.0, 0.428, 2.0),
    ("rect-vband-std", 85.0, 1500.0, 0.428, 0.0),
];

const CHARGER_3PH_VOLTAGE_BANDS: &[(&str, f64, f64, f64, f64)] = &[
    ("chg3-vband-boost", 10.0, 87.0, 0.428, 2.0),
    ("chg3-vband-std", 87.0, 1500.0, 0.428, 0.0),
];

const RECTIFIER_EFFICIENCY: &[(&str, f64, f64, f64)] = &[
    ("rect-eff-10-85", 10.0, 85.0, 0.92),
    ("rect-eff-85-300", 85.0, 300.0, 0.95),
    ("rect-eff-300-1500", 300.0, 1500.0, 0.97),
];

const CHARGER_1PH_EFFICIENCY: &[(&str, f64, f64, f64, f64, f64)] = &[
    ("chg1-eff-v10-i1", 10.0, 40.0, 1.0, 50.0, 0.85),
    ("chg1-eff-v10-i50", 10.0, 40.0, 50.0, 1000.0, 0.88),
    ("chg1-eff-v40-i1", 40.0, 100.0, 1.0, 50.0, 0.88),
    ("chg1-eff-v40-i50", 40.0, 100.0, 50.0, 1000.0, 0.90),
    ("chg1-eff-v100-i1", 100.0, 1500.0, 1.0, 50.0, 0.90),
    ("chg1-eff-v100-i50", 100.0, 1500.0, 50.0, 1000.0, 0.91),
];

const CHARGER_3PH_EFFICIENCY: &[(&str, f64, f64, f64, f64, f64)] = &[
    ("chg3-eff-v10-i1", 10.0, 40.0, 1.0, 50.0, 0.88),
    ("chg3-eff-v10-i50", 10.0, 40.0, 50.0, 1000.0, 0.90),
    ("chg3-eff-v40-i1", 40.0, 100.0, 1.0, 50.0, 0.90),
    ("chg3-eff-v40-i50", 40.0, 100.0, 50.0, 1000.0, 0.92),
    ("chg3-eff-v100-i1", 100.0, 1500.0, 1.0, 50.0, 0.92),
    ("chg3-eff-v100-i50", 100.0, 1500.0, 50.0, 1000.0, 0.94),
];

const BREAKER_FRAMES: &[(&str, f64, f64, u32)] = &[
    ("cb-15", 0.0, 15.0, 15),
    ("cb-20", 15.0, 20.0, 20),
    ("cb-25", 20.0, 25.0, 25),
    ("cb-30", 25.0, 30.0, 30),
    ("cb-35", 30.0, 35.0, 35),
    ("cb-40", 35.0, 40.0, 40),
    ("cb-45", 40.0, 45.0, 45),
    ("cb-50", 45.0, 50.0, 50),
    ("cb-60", 50.0, 60.0, 60),
    ("cb-70", 60.0, 70.0, 70),
    ("cb-80", 70.0, 80.0, 80),
    ("cb-90", 80.0, 90.0, 90),
    ("cb-100", 90.0, 100.0, 100),
    ("cb-110", 100.0, 110.0, 110),
    ("cb-125", 110.0, 125.0, 125),
    ("cb-150", 125.0, 150.0, 150),
    ("cb-175", 150.0, 175.0, 175),
    ("cb-200", 175.0, 200.0, 200),
    ("cb-225", 200.0, 225.0, 225),
    ("cb-250", 225.0, 250.0, 250),
    ("cb-300", 250.0, 300.0, 300),
    ("cb-350", 300.0, 350.0, 350),
    ("cb-400", 350.0, 400.0, 400),
    ("cb-450", 400.0, 450.0, 450),
    ("cb-500", 450.0, 500.0, 500),
    ("cb-600", 500.0, 600.0, 600),
    ("cb-700", 600.0, 700.0, 700),
    ("cb-800", 700.0, 800.0, 800),
    ("cb-1000", 800.0, 1000.0, 1000),
    ("cb-1200", 1000.0, 1200.0, 1200),
    ("cb-1600", 1200.0, 1600.0, 1600),
    ("cb-2000", 1600.0, 2000.0, 2000),
    ("cb-2500", 2000.0, 2500.0, 2500),
    ("cb-3000", 2500.0, 3000.0, 3000),
];

const CONDUCTORS: &[(&str, f64, f64, &str)] = &[
    ("wire-14awg", 0.0, 20.0, "#14"),
    ("wire-12awg", 20.0, 25.0, "#12"),
    ("wire-10awg", 25.0, 35.0, "#10"),
    ("wire-8awg", 35.0, 50.0, "#8"),
    ("wire-6awg", 50.0, 70.0, "#6"),
    ("wire-4awg", 70.0, 90.0, "#4"),
    ("wire-3awg", 90.0, 110.0, "#3"),
    ("wire-2awg", 110.0, 130.0, "#2"),
    ("wire-1awg", 130.0, 150.0, "#1"),
    ("wire-1-0", 150.0, 175.0, "1/0"),
    ("wire-2-0", 175.0, 200.0, "2/0"),
    ("wire-3-0", 200.0, 230.0, "3/0"),
    ("wire-4-0", 230.0, 260.0, "4/0"),
    ("wire-250mcm", 260.0, 290.0, "250MCM"),
    ("wire-300mcm", 290.0, 320.0, "300MCM"),
    ("wire-350mcm", 320.0, 350.0, "350MCM"),
    ("wire-400mcm", 350.0, 380.0, "400MCM"),
    ("wire-500mcm", 380.0, 430.0, "500MCM"),
    ("wire-250mcm-2x", 430.0, 580.0, "250MCM 2x"),
    ("wire-300mcm-2x", 580.0, 680.0, "300MCM 2x"),
    ("wire-350mcm-2x", 680.0, 760.0, "350MCM 2x"),
    ("wire-400mcm-2x", 760.0, 860.0, "400MCM 2x"),
    ("wire-500mcm-2x", 860.0, 1400.0, "500MCM 2x"),
];

/// All per-family reference data. Loaded and validated once, read-only
/// afterwards, so concurrent calculations can share one instance.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub rectifier_voltage_bands: Vec<VoltageBandRow>,
    pub charger_3ph_voltage_bands: Vec<VoltageBandRow>,
    pub rectifier_efficiency: Vec<EfficiencyRow>,
    pub charger_1ph_efficiency: Vec<ChargerEfficiencyRow>,
    pub charger_3ph_efficiency: Vec<ChargerEfficiencyRow>,
    pub breaker_frames: Vec<BreakerRow>,
    pub conductors: Vec<ConductorRow>,
}

static SHARED: OnceCell<ReferenceTables> = OnceCell::new();

impl ReferenceTables {
    /// Builds the compiled-in tables extracted from the legacy sizing sheet.
    pub fn builtin() -> Self {
        Self {
            rectifier_voltage_bands: voltage_rows(RECTIFIER_VOLTAGE_BANDS),
            charger_3ph_voltage_bands: voltage_rows(CHARGER_3PH_VOLTAGE_BANDS),
            rectifier_efficiency: RECTIFIER_EFFICIENCY
                .iter()
                .map(|&(id, lower_vdc, upper_vdc, efficiency)| EfficiencyRow {
                    id,
                    lower_vdc,
                    upper_vdc,
                    efficiency,
                })
                .collect(),
            charger_1ph_efficiency: charger_rows(CHARGER_1PH_EFFICIENCY),
            charger_3ph_efficiency: charger_rows(CHARGER_3PH_EFFICIENCY),
            breaker_frames: BREAKER_FRAMES
                .iter()
                .map(|&(id, lower_a, upper_a, frame_a)| BreakerRow {
                    id,
                    lower_a,
                    upper_a,
                    frame_a,
                })
                .collect(),
            conductors: CONDUCTORS
                .iter()
                .map(|&(id, lower_a, upper_a, size)| ConductorRow {
                    id,
                    lower_a,
                    upper_a,
                    size,
                })
                .collect(),
        }
    }

    /// Returns the process-wide validated table set, loading it on first use.
    pub fn shared() -> Result<&'static ReferenceTables> {
        if let Some(tables) = SHARED.get() {
            return Ok(tables);
        }
        let tables = ReferenceTables::builtin();
        tables.validate()?;
        info!(
            "Reference tables loaded: {} breaker frames, {} conductor sizes",
            tables.breaker_frames.len(),
            tables.conductors.len()
        );
        Ok(SHARED.get_or_init(|| tables))
    }

    /// Integrity check run at load time. Every table must cover its range
    /// with contiguous, non-overlapping bands.
    pub fn validate(&self) -> Result<()> {
        check_bands(
            "rectifier_voltage_bands",
            self.rectifier_voltage_bands
                .iter()
                .map(|r| (r.lower_vdc, r.upper_vdc)),
        )?;
        check_bands(
            "charger_3ph_voltage_bands",
            self.charger_3ph_voltage_bands
                .iter()
                .map(|r| (r.lower_vdc, r.upper_vdc)),
        )?;
        check_bands(
            "rectifier_efficiency",
            self.rectifier_efficiency
                .iter()
                .map(|r| (r.lower_vdc, r.upper_vdc)),
        )?;
        check_grid("charger_1ph_efficiency", &self.charger_1ph_efficiency)?;
        check_grid("charger_3ph_efficiency", &self.charger_3ph_efficiency)?;
        check_bands(
            "breaker_frames",
            self.breaker_frames.iter().map(|r| (r.lower_a, r.upper_a)),
        )?;
        check_bands(
            "conductors",
            self.conductors.iter().map(|r| (r.lower_a, r.upper_a)),
        )?;
        Ok(())
    }

    pub fn breaker_frame(&self, amps: f64) -> Result<&BreakerRow> {
        self.breaker_frames
            .iter()
            .find(|row| amps >= row.lower_a && amps < row.upper_a)
            .ok_or(SizingError::LookupGap {
                table: "breaker_frames",
                axis: LookupAxis::Current,
                value: amps,
            })
    }

    pub fn conductor(&self, amps: f64) -> Result<&ConductorRow> {
        self.conductors
            .iter()
            .find(|row| amps >= row.lower_a && amps < row.upper_a)
            .ok_or(SizingError::LookupGap {
                table: "conductors",
                axis: LookupAxis::Current,
                value: amps,
            })
    }

    pub fn rectifier_voltage_band(&self, vdc: f64) -> Result<&VoltageBandRow> {
        find_voltage_band("rectifier_voltage_bands", &self.rectifier_voltage_bands, vdc)
    }

    pub fn charger_3ph_voltage_band(&self, vdc: f64) -> Result<&VoltageBandRow> {
        find_voltage_band(
            "charger_3ph_voltage_bands",
            &self.charger_3ph_voltage_bands,
            vdc,
        )
    }

    pub fn rectifier_efficiency(&self, vdc: f64) -> Result<&EfficiencyRow> {
        self.rectifier_efficiency
            .iter()
            .find(|row| vdc >= row.lower_vdc && vdc < row.upper_vdc)
            .ok_or(SizingError::LookupGap {
                table: "rectifier_efficiency",
                axis: LookupAxis::Vdc,
                value: vdc,
            })
    }

    pub fn charger_1ph_efficiency(&self, vdc: f64, idc: f64) -> Result<&ChargerEfficiencyRow> {
        find_grid_cell("charger_1ph_efficiency", &self.charger_1ph_efficiency, vdc, idc)
    }

    pub fn charger_3ph_efficiency(&self, vdc: f64, idc: f64) -> Result<&ChargerEfficiencyRow> {
        find_grid_cell("charger_3ph_efficiency", &self.charger_3ph_efficiency, vdc, idc)
    }
}

fn voltage_rows(raw: &[(&'static str, f64, f64, f64, f64)]) -> Vec<VoltageBandRow> {
    raw.iter()
        .map(
            |&(id, lower_vdc, upper_vdc, secondary_factor, boost_v)| VoltageBandRow {
                id,
                lower_vdc,
                upper_vdc,
                secondary_factor,
                boost_v,
            },
        )
        .collect()
}

fn charger_rows(raw: &[(&'static str, f64, f64, f64, f64, f64)]) -> Vec<ChargerEfficiencyRow> {
    raw.iter()
        .map(
            |&(id, lower_vdc, upper_vdc, lower_idc, upper_idc, efficiency)| ChargerEfficiencyRow {
                id,
                lower_vdc,
                upper_vdc,
                lower_idc,
                upper_idc,
                efficiency,
            },
        )
        .collect()
}

fn find_voltage_band<'a>(
    table: &'static str,
    rows: &'a [VoltageBandRow],
    vdc: f64,
) -> Result<&'a VoltageBandRow> {
    rows.iter()
        .find(|row| vdc >= row.lower_vdc && vdc < row.upper_vdc)
        .ok_or(SizingError::LookupGap {
            table,
            axis: LookupAxis::Vdc,
            value: vdc,
        })
}

fn find_grid_cell<'a>(
    table: &'static str,
    rows: &'a [ChargerEfficiencyRow],
    vdc: f64,
    idc: f64,
) -> Result<&'a ChargerEfficiencyRow> {
    if !rows
        .iter()
        .any(|row| vdc >= row.lower_vdc && vdc < row.upper_vdc)
    {
        return Err(SizingError::LookupGap {
            table,
            axis: LookupAxis::Vdc,
            value: vdc,
        });
    }
    rows.iter()
        .find(|row| {
            vdc >= row.lower_vdc && vdc < row.upper_vdc && idc >= row.lower_idc && idc < row.upper_idc
        })
        .ok_or(SizingError::LookupGap {
            table,
            axis: LookupAxis::Idc,
            value: idc,
        })
}

fn check_bands(
    table: &'static str,
    bands: impl Iterator<Item = (f64, f64)>,
) -> Result<()> {
    let bands: Vec<(f64, f64)> = bands.collect();
    if bands.is_empty() {
        return Err(SizingError::AmbiguousBand {
            table,
            reason: "table has no rows".to_string(),
        });
    }
    for &(lower, upper) in &bands {
        if !(lower < upper) {
            return Err(SizingError::AmbiguousBand {
                table,
                reason: format!("band [{lower}, {upper}) is empty or inverted"),
            });
        }
    }
    for pair in bands.windows(2) {
        let (_, prev_upper) = pair[0];
        let (next_lower, _) = pair[1];
        if next_lower < prev_upper {
            return Err(SizingError::AmbiguousBand {
                table,
                reason: format!("bands overlap at {next_lower}"),
            });
        }
        if next_lower > prev_upper {
            return Err(SizingError::AmbiguousBand {
                table,
                reason: format!("coverage gap between {prev_upper} and {next_lower}"),
            });
        }
    }
    Ok(())
}

fn check_grid(table: &'static str, rows: &[ChargerEfficiencyRow]) -> Result<()> {
    if rows.is_empty() {
        return Err(SizingError::AmbiguousBand {
            table,
            reason: "table has no rows".to_string(),
        });
    }
    // Voltage bands across the grid, in row-major order.
    let mut voltage_bands: Vec<(f64, f64)> = Vec::new();
    for row in rows {
        let band = (row.lower_vdc, row.upper_vdc);
        if voltage_bands.last() != Some(&band) {
            voltage_bands.push(band);
        }
    }
    check_bands(table, voltage_bands.iter().copied())?;
    // Current bands within each voltage band.
    for &(lower_vdc, upper_vdc) in &voltage_bands {
        let currents = rows
            .iter()
            .filter(|row| row.lower_vdc == lower_vdc && row.upper_vdc == upper_vdc)
            .map(|row| (row.lower_idc, row.upper_idc));
        check_bands(table, currents)?;
    }
    Ok(())
}
