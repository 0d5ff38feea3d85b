// gantry/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use gantry_common::error::Result;
use gantry_common::Config;

pub mod boot;
pub mod categories;
pub mod resolve;
pub mod scope;

use crate::cli::boot::Boot;
use crate::cli::resolve::Resolve;
use crate::cli::scope::Scope;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "gantry", bin_name = "gantry")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Boot(Boot),
    Resolve(Resolve),
    Scope(Scope),
    /// List the built-in policy categories
    Categories,
}

impl Command {
    pub fn run(&self, config: Config) -> Result<()> {
        match self {
            Self::Boot(command) => command.run(config),
            Self::Resolve(command) => command.run(config),
            Self::Scope(command) => command.run(config),
            Self::Categories => categories::run(&config),
        }
    }
}
