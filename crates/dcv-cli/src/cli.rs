use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dcv", about = "Inspect and verify encoded interpreter values", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with format version and decode limits
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write an encoded sample composite
    Sample(SampleArgs),
    /// Decode a buffer and show its identity and fields
    Inspect(InspectArgs),
    /// Check that a buffer re-encodes byte for byte
    Verify(VerifyArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct InputArgs {
    /// File holding the encoded value
    pub path: PathBuf,
    /// Input is hex text rather than raw bytes
    #[arg(long)]
    pub hex: bool,
    /// Owner address handed to decoded composites
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(Args)]
pub struct SampleArgs {
    /// Output file; hex goes to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Write hex text instead of raw bytes
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Also decode and list the fields
    #[arg(long)]
    pub fields: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Walk every nested composite body as well
    #[arg(long)]
    pub deep: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_inspect() {
        let cli = Cli::parse_from([
            "dcv", "inspect", "value.bin", "--hex", "--fields", "--format", "json",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        let Command::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert!(args.fields);
        assert!(args.input.hex);
        assert_eq!(args.input.path, PathBuf::from("value.bin"));
    }

    #[test]
    fn parses_verify_with_config() {
        let cli = Cli::parse_from(["dcv", "--config", "dcv.toml", "verify", "v.bin", "--deep"]);
        assert_eq!(cli.config, Some(PathBuf::from("dcv.toml")));
        assert!(matches!(cli.command, Command::Verify(VerifyArgs { deep: true, .. })));
    }
}
