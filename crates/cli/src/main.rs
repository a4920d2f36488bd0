//! ottometer CLI entry point.

use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "ottometer")]
#[command(about = "Manage grow units stored in an ottometer database", long_about = None)]
struct Cli {
    /// Path of the database
    #[arg(short, long, global = true, default_value = "ottometer.db")]
    db_path: PathBuf,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => {
            let ctx = commands::Context {
                db_path: cli.db_path,
                json: cli.json,
            };
            if let Err(e) = commands::run(cmd, &ctx) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("ottometer - grow unit bookkeeping");
            println!("Run 'ottometer --help' for usage information.");
        }
    }
}
