use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod build;
pub mod identity;
pub mod parse;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wrap a JSON payload in an envelope and print it.
    Build(BuildArgs),
    /// Decode an envelope and print its payload and metadata.
    Parse(ParseArgs),
    /// Generate a fresh service identity.
    Identity,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Build(args) => build::run(args),
        Command::Parse(args) => parse::run(args, format),
        Command::Identity => identity::run(),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Identity of the producing service (36-character UUID).
    #[arg(long, env = "PUBPRIMS_SERVICE_IDENTITY")]
    pub identity: String,
    /// Topic the envelope is published on.
    #[arg(long, short = 't')]
    pub topic: String,
    /// JSON payload.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the JSON payload from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Codec configuration file (JSON).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Envelope file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,
    /// Directory of `<topic>.schema.json` files to validate JSON payloads against.
    #[arg(long, value_name = "DIR", env = "PUBPRIMS_SCHEMA_DIR")]
    pub schemas: Option<PathBuf>,
    /// Require a top-level string field to fully match a regex (FIELD=REGEX).
    #[arg(long = "match", value_name = "FIELD=REGEX")]
    pub matches: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
