//! Grow unit write commands.

use super::show::print_unit;
use super::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use ottometer_core::{GrowMedium, GrowUnit};
use ottometer_storage::{GrowUnitStore, Storage};

/// Grow unit attributes accepted by `add` and `update`.
#[derive(Args, Debug)]
pub struct UnitArgs {
    /// Display name
    #[arg(long, default_value = "")]
    name: String,

    /// Width (must be greater than zero)
    #[arg(long)]
    width: u64,

    /// Height
    #[arg(long, default_value = "0")]
    height: u64,

    /// Depth
    #[arg(long, default_value = "0")]
    depth: u64,

    /// Grow medium: dirt, water or cocos
    #[arg(long)]
    medium: String,

    /// Lamp wattage
    #[arg(long, default_value = "0")]
    wattage_lamp: u64,

    /// Outtake fan throughput in m³/h
    #[arg(long, default_value = "0")]
    fan_throughput: u64,

    /// Unit has a carbon filter
    #[arg(long)]
    carbon_filter: bool,

    /// Unit has an active intake
    #[arg(long)]
    active_intake: bool,

    /// Unit is ventilated
    #[arg(long)]
    ventilation: bool,

    /// Unit stands indoors
    #[arg(long)]
    inside: bool,
}

impl From<UnitArgs> for GrowUnit {
    fn from(args: UnitArgs) -> Self {
        GrowUnit {
            id: 0,
            name: args.name,
            width: args.width,
            height: args.height,
            depth: args.depth,
            carbon_filter: args.carbon_filter,
            active_intake: args.active_intake,
            outtake_fan_throughput_in_m3h: args.fan_throughput,
            wattage_lamp: args.wattage_lamp,
            ventilation: args.ventilation,
            inside: args.inside,
            grow_medium: GrowMedium::from(args.medium),
        }
    }
}

#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    unit: UnitArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Identifier to write to (created if unused)
    id: u64,

    #[command(flatten)]
    unit: UnitArgs,
}

pub fn add(storage: &Storage, ctx: &Context, args: AddArgs) -> Result<()> {
    let store = GrowUnitStore::new(storage);
    let id = store
        .create(&args.unit.into())
        .with_context(|| "Failed to add grow unit")?;

    report(&store, ctx, id, "Added")
}

pub fn update(storage: &Storage, ctx: &Context, args: UpdateArgs) -> Result<()> {
    let store = GrowUnitStore::new(storage);
    let id = store
        .update(&args.unit.into(), args.id)
        .with_context(|| format!("Failed to update grow unit {}", args.id))?;

    report(&store, ctx, id, "Saved")
}

fn report(store: &GrowUnitStore<'_>, ctx: &Context, id: u64, verb: &str) -> Result<()> {
    if ctx.json {
        println!("{}", id);
        return Ok(());
    }

    println!(
        "{}  {} grow unit {}",
        "✓".green().bold(),
        verb,
        id.to_string().bright_yellow()
    );
    print_unit(&store.get(id)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        unit: UnitArgs,
    }

    fn unit_args(args: &[&str]) -> UnitArgs {
        let mut argv = vec!["ottometer"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).unit
    }

    fn quiet() -> Context {
        Context {
            db_path: Default::default(),
            json: true,
        }
    }

    #[test]
    fn test_unit_args_conversion() {
        let unit: GrowUnit = unit_args(&[
            "--width",
            "120",
            "--depth",
            "60",
            "--height",
            "180",
            "--medium",
            "cocos",
            "--fan-throughput",
            "400",
            "--carbon-filter",
        ])
        .into();

        assert_eq!(unit.width, 120);
        assert_eq!(unit.area(), 7_200);
        assert_eq!(unit.grow_medium, GrowMedium::Cocos);
        assert_eq!(unit.outtake_fan_throughput_in_m3h, 400);
        assert!(unit.carbon_filter);
        assert!(!unit.inside);
    }

    #[test]
    fn test_add_then_update() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let ctx = quiet();

        let unit = unit_args(&["--width", "10", "--medium", "dirt"]);
        let expected = GrowUnit::from(unit_args(&["--width", "10", "--medium", "dirt"]));
        add(&storage, &ctx, AddArgs { unit }).unwrap();
        assert_eq!(
            GrowUnitStore::new(&storage).get(1).unwrap(),
            expected.with_id(1)
        );

        let unit = unit_args(&["--width", "20", "--medium", "water"]);
        update(&storage, &ctx, UpdateArgs { id: 1, unit }).unwrap();

        let stored = GrowUnitStore::new(&storage).get(1).unwrap();
        assert_eq!(stored.width, 20);
        assert_eq!(stored.grow_medium, GrowMedium::Water);
    }

    #[test]
    fn test_add_rejects_unknown_medium() {
        let storage = Storage::open_temporary().unwrap();

        let unit = unit_args(&["--width", "10", "--medium", "sand"]);
        let result = add(&storage, &quiet(), AddArgs { unit });

        assert!(result.is_err());
        assert!(GrowUnitStore::new(&storage).list().unwrap().is_empty());
    }
}
