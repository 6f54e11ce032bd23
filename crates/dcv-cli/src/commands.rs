use anyhow::Context;
use colored::Colorize;
use dcv_value::{
    decode_value_with, encode_value_as, validate, DecodeContext, LoadState, ValidationReport,
    Value,
};
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;
use crate::input::{parse_owner, read_buffer};
use crate::render::{composite_to_json, value_to_json};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    debug!(version = %config.format_version, "configuration loaded");
    match cli.command {
        Command::Sample(args) => cmd_sample(args, &config),
        Command::Inspect(args) => cmd_inspect(args, &config, cli.format),
        Command::Verify(args) => cmd_verify(args, &config, cli.format),
        Command::Config => cmd_config(&config, cli.format),
    }
}

fn decode_input(
    input: &InputArgs,
    config: &CliConfig,
) -> anyhow::Result<(Vec<u8>, DecodeContext, Value)> {
    let bytes = read_buffer(&input.path, input.hex)?;
    let ctx = config.decode_context(parse_owner(input.owner.as_deref())?);
    let value = decode_value_with(bytes.clone(), &ctx)
        .with_context(|| format!("decoding {}", input.path.display()))?;
    Ok((bytes, ctx, value))
}

fn cmd_sample(args: SampleArgs, config: &CliConfig) -> anyhow::Result<()> {
    let bytes = encode_value_as(&crate::sample::person(), config.format_version)?;
    match args.output {
        Some(path) => {
            let contents = if args.hex { hex::encode(&bytes).into_bytes() } else { bytes.clone() };
            std::fs::write(&path, contents)
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "{} Wrote {} byte sample ({}) to {}",
                "✓".green().bold(),
                bytes.len(),
                config.format_version,
                path.display().to_string().bold()
            );
        }
        None => println!("{}", hex::encode(&bytes)),
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (bytes, ctx, mut value) = decode_input(&args.input, config)?;
    match &mut value {
        Value::Composite(composite) => match format {
            OutputFormat::Json => {
                let json = composite_to_json(composite, args.fields, ctx.limits.max_depth)?;
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => {
                println!("{} {}", "Composite".bold(), composite.type_id()?.yellow().bold());
                println!("  Kind:     {}", composite.kind()?.to_string().cyan());
                println!("  Location: {}", composite.location()?);
                println!("  Size:     {} bytes ({})", bytes.len(), ctx.version);
                if let Some(owner) = ctx.owner {
                    println!("  Owner:    {owner}");
                }
                if args.fields {
                    let fields = composite.fields()?;
                    println!("  Fields:   {}", fields.len());
                    for (name, field) in fields {
                        println!("    {}: {}", name.green(), field);
                    }
                }
            }
        },
        leaf => match format {
            OutputFormat::Json => {
                let json = value_to_json(leaf, ctx.limits.max_depth)?;
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => println!("{} {}", leaf.tag().name().cyan(), leaf),
        },
    }
    Ok(())
}

/// Outcome of `dcv verify`.
#[derive(Debug)]
pub struct VerifyReport {
    pub len: usize,
    pub stable: bool,
    pub load_state: Option<LoadState>,
    pub deep: Option<ValidationReport>,
}

/// Decode, re-encode without touching anything, and compare the bytes.
pub fn verify_buffer(
    bytes: Vec<u8>,
    ctx: &DecodeContext,
    deep: bool,
) -> anyhow::Result<VerifyReport> {
    let deep = if deep {
        Some(validate(bytes.clone(), ctx)?)
    } else {
        None
    };
    let value = decode_value_with(bytes.clone(), ctx)?;
    let reencoded = encode_value_as(&value, ctx.version)?;
    Ok(VerifyReport {
        len: bytes.len(),
        stable: reencoded == bytes,
        load_state: value.as_composite().map(|c| c.load_state()),
        deep,
    })
}

fn cmd_verify(args: VerifyArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = read_buffer(&args.input.path, args.input.hex)?;
    let ctx = config.decode_context(parse_owner(args.input.owner.as_deref())?);
    let report = verify_buffer(bytes, &ctx, args.deep)
        .with_context(|| format!("verifying {}", args.input.path.display()))?;

    match format {
        OutputFormat::Json => {
            let json = json!({
                "len": report.len,
                "stable": report.stable,
                "load_state": report.load_state.map(|s| format!("{s:?}")),
                "deep": report.deep.map(|d| json!({
                    "values": d.values,
                    "composites": d.composites,
                    "max_depth": d.max_depth,
                })),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if report.stable {
                println!(
                    "{} Re-encoding is byte-identical ({} bytes)",
                    "✓".green().bold(),
                    report.len
                );
            } else {
                println!("{} Re-encoding differs from input", "✗".red().bold());
            }
            if let Some(state) = report.load_state {
                println!("  Load state after encode: {}", format!("{state:?}").cyan());
            }
            if let Some(deep) = report.deep {
                println!(
                    "  Deep check: {} values, {} composites, depth {}",
                    deep.values, deep.composites, deep.max_depth
                );
            }
        }
    }

    if !report.stable {
        anyhow::bail!("{} does not re-encode byte for byte", args.input.path.display());
    }
    Ok(())
}

fn cmd_config(config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
