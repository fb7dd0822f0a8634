use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cardsmith", version, about = "Render social-media card images")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a card and write it to its output path.
    Render(RenderArgs),
    /// Print the wrapped lines of every text block as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input card options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path; overrides `output` from the options. `.png` selects PNG, anything else JPEG.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Paint lime center guides.
    #[arg(long)]
    guides: bool,

    /// API key for the compression service; overrides `compression.apiKey`.
    #[arg(long, env = "CARDSMITH_COMPRESSION_KEY", hide_env_values = true)]
    compression_key: Option<String>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input card options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Measure with fixed synthetic metrics instead of the configured fonts.
    #[arg(long)]
    synthetic: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn assets_root(in_path: &Path) -> &Path {
    match in_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn read_options(path: &Path) -> anyhow::Result<cardsmith::CardOptions> {
    cardsmith::CardOptions::from_path(path)
        .with_context(|| format!("load card options '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut options = read_options(&args.in_path)?;
    if let Some(out) = args.out {
        options.output = Some(out);
    }
    if args.guides {
        options.guides = true;
    }
    if let Some(api_key) = args.compression_key {
        let store = options.compression.take().and_then(|c| c.store);
        options.compression = Some(cardsmith::CompressionConfig { api_key, store });
    }

    let outcome = cardsmith::make_card(&options, assets_root(&args.in_path))
        .with_context(|| format!("render card '{}'", args.in_path.display()))?;
    tracing::debug!(?outcome, "card done");
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let options = read_options(&args.in_path)?;
    let root = assets_root(&args.in_path);
    let req = options.to_request(None)?;

    let blocks = if args.synthetic {
        let mut surface = cardsmith::RecordingSurface::new();
        cardsmith::layout_card(&mut surface, &req)?
    } else {
        let fonts = cardsmith::load_fonts(&options, root)?;
        let mut surface = cardsmith::CpuSurface::new(req.canvas, fonts)?;
        cardsmith::layout_card(&mut surface, &req)?
    };

    let json = serde_json::to_string_pretty(&blocks).context("serialize layout")?;
    println!("{json}");
    Ok(())
}
