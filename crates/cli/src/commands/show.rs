//! Read-only grow unit commands.

use super::Context;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use ottometer_core::GrowUnit;
use ottometer_storage::{GrowUnitStore, Storage};

#[derive(Args)]
pub struct GetArgs {
    /// Grow unit identifier
    id: u64,
}

pub fn list(storage: &Storage, ctx: &Context) -> Result<()> {
    let units = GrowUnitStore::new(storage).list()?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    if units.is_empty() {
        println!("{}", "No grow units stored yet.".bright_black());
        return Ok(());
    }

    println!("{}", format!("Grow units ({}):", units.len()).bold().cyan());
    println!();
    for unit in &units {
        println!(
            "  {:>4}  {:<16} {:>5} x {:>5} x {:>5}  {}",
            unit.id.to_string().bright_yellow(),
            display_name(unit),
            unit.width,
            unit.depth,
            unit.height,
            unit.grow_medium.to_string().green()
        );
    }
    println!();

    Ok(())
}

pub fn get(storage: &Storage, ctx: &Context, args: GetArgs) -> Result<()> {
    let unit = GrowUnitStore::new(storage).get(args.id)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&unit)?);
        return Ok(());
    }

    print_unit(&unit);
    Ok(())
}

/// Print a grow unit with its derived metrics.
pub fn print_unit(unit: &GrowUnit) {
    println!();
    println!("{}", "Grow Unit:".bold().cyan());
    println!();
    println!("  Id:            {}", unit.id.to_string().bright_yellow());
    println!("  Name:          {}", display_name(unit));
    println!(
        "  Dimensions:    {} x {} x {} (w x d x h)",
        unit.width, unit.depth, unit.height
    );
    println!("  Area:          {}", unit.area().to_string().bright_cyan());
    println!("  Volume:        {}", unit.volume().to_string().bright_cyan());
    println!("  Grow Medium:   {}", unit.grow_medium.to_string().green());
    println!("  Lamp:          {} W", unit.wattage_lamp);
    println!(
        "  Outtake Fan:   {} m³/h",
        unit.outtake_fan_throughput_in_m3h
    );
    println!("  Carbon Filter: {}", yes_no(unit.carbon_filter));
    println!("  Active Intake: {}", yes_no(unit.active_intake));
    println!("  Ventilation:   {}", yes_no(unit.ventilation));
    println!("  Inside:        {}", yes_no(unit.inside));
    println!();
}

fn display_name(unit: &GrowUnit) -> String {
    if unit.name.is_empty() {
        "-".to_string()
    } else {
        unit.name.clone()
    }
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "Yes".green()
    } else {
        "No".bright_black()
    }
}
