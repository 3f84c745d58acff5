mod config;
mod output;

use std::io::{Read, Write};

use bitflake::{Decoder, Encoder, WallClock};
use clap::Parser;
use config::{CliArgs, Command, DecodeArgs, GenerateArgs, OutputFormat, Scheme, validate_count};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Generate(args) => run_generate(args),
        Command::Decode(args) => run_decode(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    validate_count(args.count)?;
    let scheme = Scheme::try_from(&args.scheme)?;
    let encoder = Encoder::new(
        scheme.layout,
        scheme.clock,
        args.node_primary,
        args.node_secondary,
    )?;

    let ids = match args.at {
        Some(now_ms) => encoder.encode_batch_at(args.count, now_ms)?,
        None => encoder.encode_batch(args.count, &WallClock)?,
    };
    tracing::debug!(count = ids.len(), "generated ids");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for id in ids {
        if args.padded {
            writeln!(out, "{}", id.to_padded_string())?;
        } else {
            writeln!(out, "{id}")?;
        }
    }
    Ok(())
}

fn run_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let scheme = Scheme::try_from(&args.scheme)?;
    let decoder = Decoder::new(scheme.layout, scheme.clock);

    let input = if args.ids.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        args.ids.join("\n")
    };

    let lines = decoder.decode_lines(&input);
    let failures = lines.iter().filter(|l| l.result.is_err()).count();
    if failures > 0 {
        tracing::debug!(failures, total = lines.len(), "some lines failed to decode");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => output::write_text(&mut out, &lines)?,
        OutputFormat::Csv => output::write_csv(&mut out, &lines)?,
        OutputFormat::Json => output::write_json(&mut out, &lines)?,
    }
    Ok(())
}
