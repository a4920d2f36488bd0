//! CLI commands module.

use anyhow::{Context as _, Result};
use clap::Subcommand;
use ottometer_storage::Storage;
use std::path::PathBuf;

mod edit;
mod show;

/// Options shared by every command.
pub struct Context {
    pub db_path: PathBuf,
    pub json: bool,
}

impl Context {
    fn open(&self) -> Result<Storage> {
        Storage::open(&self.db_path).with_context(|| {
            format!(
                "Failed to open database {:?}. Is the server holding it open?",
                self.db_path
            )
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all grow units
    List,
    /// Show one grow unit
    Get(show::GetArgs),
    /// Add a grow unit
    Add(edit::AddArgs),
    /// Replace the grow unit stored at an identifier
    Update(edit::UpdateArgs),
}

pub fn run(cmd: Commands, ctx: &Context) -> Result<()> {
    let storage = ctx.open()?;
    match cmd {
        Commands::List => show::list(&storage, ctx),
        Commands::Get(args) => show::get(&storage, ctx, args),
        Commands::Add(args) => edit::add(&storage, ctx, args),
        Commands::Update(args) => edit::update(&storage, ctx, args),
    }
}
