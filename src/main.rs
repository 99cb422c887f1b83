use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use blind_watermark as wm;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wm::{Config, Decoded, Decoder, Depth, Encoder, Hardening, Payload, PayloadKind, Strategy};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with parameters, missing fields keep their defaults.
    #[clap(long, global = true, value_parser)]
    config: Option<PathBuf>,

    /// Log debug output.
    #[clap(short, long, global = true, action)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, ValueEnum)]
enum StrategyArg {
    Dct,
    Dft,
}

impl From<StrategyArg> for Strategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Dct => Strategy::Dct,
            StrategyArg::Dft => Strategy::Dft,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum KindArg {
    Text,
    Image,
    Mask,
}

impl From<KindArg> for PayloadKind {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::Text => PayloadKind::Text,
            KindArg::Image => PayloadKind::Image,
            KindArg::Mask => PayloadKind::Mask,
        }
    }
}

#[derive(Args)]
struct Embed {
    /// Carrier image.
    #[clap(action)]
    input: PathBuf,

    /// Where to write the watermarked image.
    #[clap(action)]
    output: PathBuf,

    /// Transform to embed with.
    #[clap(long, value_enum, default_value_t = StrategyArg::Dct)]
    strategy: StrategyArg,

    /// Text to hide.
    #[clap(long, conflicts_with = "image", required_unless_present = "image")]
    text: Option<String>,

    /// Watermark image to hide.
    #[clap(long, value_parser)]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct Extract {
    /// Watermarked image.
    #[clap(action)]
    input: PathBuf,

    /// Where to write the recovered text or image.
    #[clap(action)]
    output: PathBuf,

    /// Transform the image was embedded with.
    #[clap(long, value_enum, default_value_t = StrategyArg::Dct)]
    strategy: StrategyArg,

    /// What to recover.
    #[clap(long, value_enum, default_value_t = KindArg::Text)]
    kind: KindArg,
}

#[derive(Args)]
struct Transfer {
    /// The file to operate on.
    #[clap(action)]
    input: PathBuf,

    /// Where to write the result.
    #[clap(action)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed text or a watermark image into a carrier.
    Embed(Embed),
    /// Recover text or a watermark image.
    Extract(Extract),
    /// Apply the bias and interleave passes.
    Harden(Transfer),
    /// Undo the bias and interleave passes.
    Soften(Transfer),
    /// Make the white background of a binary image transparent.
    Mask(Transfer),
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("could not parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn embed(v: &Embed, config: Config) -> Result<()> {
    let payload = match (&v.text, &v.image) {
        (Some(text), _) => Payload::Text(text.clone()),
        (None, Some(path)) => Payload::Image(wm::io::read(path, Depth::ColorAlpha)?),
        (None, None) => anyhow::bail!("either --text or --image is needed"),
    };
    Encoder::new(v.strategy.into(), config)
        .encode(&v.input, &payload, &v.output)
        .with_context(|| format!("failed to embed into {}", v.input.display()))
}

fn extract(v: &Extract, config: Config) -> Result<()> {
    let decoded = Decoder::new(v.strategy.into(), config)
        .decode(&v.input, &v.output, v.kind.into())
        .with_context(|| format!("failed to extract from {}", v.input.display()))?;
    if let Decoded::Text(text) = decoded {
        println!("{text}");
    }
    Ok(())
}

fn harden(v: &Transfer, config: &Config, undo: bool) -> Result<()> {
    let mut grid = wm::io::read(&v.input, Depth::Native)?;
    let hardening = Hardening::spread(config.threshold);
    if undo {
        hardening.undo(&mut grid)?;
    } else {
        hardening.apply(&mut grid)?;
    }
    wm::io::write(&v.output, &grid)?;
    Ok(())
}

fn mask(v: &Transfer) -> Result<()> {
    let binary = wm::io::read(&v.input, Depth::Gray)?;
    wm::io::write(&v.output, &wm::mask::to_alpha_visualization(&binary))?;
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Embed(v) => embed(v, config),
        Commands::Extract(v) => extract(v, config),
        Commands::Harden(v) => harden(v, &config, false),
        Commands::Soften(v) => harden(v, &config, true),
        Commands::Mask(v) => mask(v),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("blind_watermark={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&cli) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
