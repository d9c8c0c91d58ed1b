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
//! Interactive wizard used when the CLI runs without sizing flags. Every
//! prompt retries until the operator enters something usable, so the wizard
//! never hands a malformed value to the engine.

use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};

use dcps_sizing_engine::{EquipmentFamily, SizingInput};

const FAMILY_LABELS: [&str; 3] = [
    "Rectifier (three-phase primary)",
    "Battery charger (single-phase primary)",
    "Battery charger (three-phase primary)",
];

/// Walks the operator through the four sizing inputs.
pub fn prompt_input() -> Result<SizingInput> {
    let family = match prompt_choice("Equipment family", &FAMILY_LABELS, 0)? {
        0 => EquipmentFamily::Rectifier,
        1 => EquipmentFamily::SinglePhaseCharger,
        _ => EquipmentFamily::ThreePhaseCharger,
    };
    let vdc = prompt_f64("Nominal DC voltage (V)")?;
    let idc = prompt_f64("Rated DC current (A)")?;
    let vpri = prompt_f64("Primary AC supply voltage (V)")?;
    let input = SizingInput::new(family, vdc, idc, vpri)?;
    Ok(input)
}

fn prompt_text(prompt: &str, default: Option<&str>) -> Result<String> {
    loop {
        if let Some(default) = default {
            print!("{prompt} [{default}]: ");
        } else {
            print!("{prompt}: ");
        }
        io::stdout()
            .flush()
            .context("failed to flush prompt to stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("failed to read response from stdin")?;
        if read == 0 {
            return Err(anyhow!("input stream closed"));
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_owned());
            }
            println!("Input cannot be empty. Please try again.");
            continue;
        }
        return Ok(trimmed.to_owned());
    }
}

fn prompt_f64(prompt: &str) -> Result<f64> {
    loop {
        let raw = prompt_text(prompt, None)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => return Ok(value),
            _ => println!("Enter a positive number."),
        }
    }
}

fn prompt_choice(prompt: &str, options: &[&str], default_index: usize) -> Result<usize> {
    if options.is_empty() {
        return Err(anyhow!("prompt_choice requires at least one option"));
    }
    let default_index = default_index.min(options.len() - 1);
    loop {
        println!("{prompt}");
        for (idx, option) in options.iter().enumerate() {
            println!("  {}. {}", idx + 1, option);
        }
        let default_prompt = format!("{}", default_index + 1);
        let input = prompt_text("Select option", Some(&default_prompt))?;
        match input.parse::<usize>() {
            Ok(value) if (1..=options.len()).contains(&value) => return Ok(value - 1),
            _ => println!("Enter a number between 1 and {}.", options.len()),
        }
    }
}
