use anyhow::bail;
use bitflake::{ClockConfig, Layout, Preset, TWITTER_EPOCH_MS};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line surface of the `bitflake` binary.
///
/// Every scheme parameter is independently tunable from flags or
/// environment variables; a [`Preset`] collapses all of them into one flag.
/// The same scheme must be used on both sides of an encode/decode round
/// trip.
#[derive(Parser, Debug)]
#[command(
    name = "bitflake",
    version,
    about = "Encode and decode configurable Snowflake-style bit-field IDs"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one or more IDs, printed as decimal strings.
    Generate(GenerateArgs),
    /// Decode decimal IDs back into their fields.
    Decode(DecodeArgs),
}

/// The id-scheme configuration shared by both subcommands: four bit
/// widths, an epoch, and a tick granularity.
#[derive(Args, Debug, Clone)]
pub struct SchemeArgs {
    /// Named preset supplying layout, epoch, and tick in one flag
    /// (twitter, sonyflake, discord, instagram). Overrides the individual
    /// scheme flags below.
    ///
    /// Environment variable: `BITFLAKE_PRESET`
    #[arg(long, env = "BITFLAKE_PRESET")]
    pub preset: Option<Preset>,

    /// Timestamp field width in bits (0..=63).
    #[arg(long, default_value_t = 41)]
    pub timestamp_bits: u32,

    /// Node primary field width in bits (0..=63). Zero disables the field.
    #[arg(long, default_value_t = 5)]
    pub node_primary_bits: u32,

    /// Node secondary field width in bits (0..=63). Zero disables the field.
    #[arg(long, default_value_t = 5)]
    pub node_secondary_bits: u32,

    /// Sequence field width in bits (0..=63).
    #[arg(long, default_value_t = 12)]
    pub sequence_bits: u32,

    /// Epoch in milliseconds since the Unix epoch; the timestamp field
    /// counts ticks from here.
    #[arg(long, default_value_t = TWITTER_EPOCH_MS)]
    pub epoch_ms: u64,

    /// Milliseconds per timestamp tick (Sonyflake uses 10).
    #[arg(long, default_value_t = 1)]
    pub tick_ms: u64,
}

/// A validated layout + clock pair, resolved from [`SchemeArgs`].
#[derive(Copy, Clone, Debug)]
pub struct Scheme {
    pub layout: Layout,
    pub clock: ClockConfig,
}

impl TryFrom<&SchemeArgs> for Scheme {
    type Error = anyhow::Error;

    fn try_from(args: &SchemeArgs) -> Result<Self, Self::Error> {
        let scheme = match args.preset {
            Some(preset) => Self {
                layout: preset.layout(),
                clock: preset.clock(),
            },
            None => Self {
                layout: Layout::new(
                    args.timestamp_bits,
                    args.node_primary_bits,
                    args.node_secondary_bits,
                    args.sequence_bits,
                )?,
                clock: ClockConfig::new(args.epoch_ms, args.tick_ms)?,
            },
        };

        if scheme.layout.exceeds_safe_bits() {
            tracing::warn!(
                total_bits = scheme.layout.total_bits(),
                "layout exceeds 63 bits; ids will not fit 64-bit or double-safe consumers"
            );
        }
        Ok(scheme)
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub scheme: SchemeArgs,

    /// Node primary id, range-checked against its field width.
    ///
    /// Environment variable: `BITFLAKE_NODE_PRIMARY`
    #[arg(long, env = "BITFLAKE_NODE_PRIMARY", default_value_t = 0)]
    pub node_primary: u64,

    /// Node secondary id, range-checked against its field width.
    ///
    /// Environment variable: `BITFLAKE_NODE_SECONDARY`
    #[arg(long, env = "BITFLAKE_NODE_SECONDARY", default_value_t = 0)]
    pub node_secondary: u64,

    /// Number of IDs to generate.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Freeze the clock at a fixed instant (milliseconds since the Unix
    /// epoch) instead of reading the wall clock.
    #[arg(long)]
    pub at: Option<u64>,

    /// Zero-pad ids so their string order matches numeric order.
    #[arg(long, default_value_t = false)]
    pub padded: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub scheme: SchemeArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// IDs to decode. When omitted, newline-separated IDs are read from
    /// stdin; blank lines are ignored, and a bad line never aborts the
    /// batch.
    pub ids: Vec<String>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable block per input line.
    Text,
    /// One CSV row per input line, with an error column.
    Csv,
    /// A JSON array with one object per input line.
    Json,
}

pub fn validate_count(count: usize) -> anyhow::Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    Ok(())
}
