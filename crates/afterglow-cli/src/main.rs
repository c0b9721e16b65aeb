//! afterglow - stylised image effects from the command line
//!
//! One subcommand per filter, plus `chain`, `recipe` and `list`.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use afterglow_ops::FilterKind;

mod commands;

#[derive(Parser)]
#[command(name = "afterglow")]
#[command(author, version, about = "Stylised image effects")]
#[command(long_about = "
Applies stylised effects to PNG and JPEG images.

Examples:
  afterglow halftone in.jpg -o out.png -p cell=6
  afterglow perlin-warp in.jpg -o out.png -p scale=24 -p intensity=8
  afterglow chain in.jpg -o out.png glitch:prob=0.3 crt
  afterglow chain in.jpg -o out.png \"ascii:charset=' .:-=+*#%@',cols=80\"
  afterglow recipe look.yaml in.jpg -o out.png
  afterglow list react_diff
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v: debug log, -vv: trace log)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Give up on iterative filters after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<f64>,

    /// Font family for `ascii` glyphs (monospace, serif, sans-serif or a name)
    #[cfg(feature = "text")]
    #[arg(long, global = true)]
    font: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Black dots on white, sized by block brightness
    Halftone(FilterArgs),

    /// Displace pixels along smooth value noise
    #[command(visible_alias = "warp")]
    PerlinWarp(FilterArgs),

    /// Mirror angular slices around the centre
    #[command(visible_alias = "kale")]
    Kaleidoscope(FilterArgs),

    /// Soft bloom around bright areas
    #[command(visible_alias = "bloom")]
    Glow(FilterArgs),

    /// RGB split and torn scanlines
    Glitch(FilterArgs),

    /// Sort bright runs of pixels by luminance
    #[command(visible_alias = "sort")]
    PixelSort(FilterArgs),

    /// Drag colour along lines of equal brightness
    #[command(visible_alias = "flow")]
    FlowPaint(FilterArgs),

    /// Gray-Scott reaction-diffusion pattern
    #[command(visible_alias = "rd")]
    ReactDiff(FilterArgs),

    /// Render as ASCII art
    Ascii(FilterArgs),

    /// Curved screen, scanlines and shadow mask
    Crt(FilterArgs),

    /// Kuwahara oil-paint smoothing
    #[command(name = "oilpaint", visible_alias = "kuwahara")]
    OilPaint(FilterArgs),

    /// Glowing hue-cycled edges
    Neon(FilterArgs),

    /// Apply a sequence of `name:key=value,...` steps
    Chain(ChainArgs),

    /// Apply the steps listed in a YAML file
    Recipe(RecipeArgs),

    /// List filters and their parameters
    #[command(visible_alias = "ls")]
    List(ListArgs),
}

/// Arguments shared by the single-filter commands.
#[derive(Args)]
struct FilterArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Parameter override, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
}

/// Arguments for the `chain` command.
#[derive(Args)]
struct ChainArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Steps applied left to right
    #[arg(required = true, value_name = "STEP")]
    steps: Vec<String>,
}

/// Arguments for the `recipe` command.
#[derive(Args)]
struct RecipeArgs {
    /// YAML recipe
    recipe: PathBuf,

    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,
}

/// Arguments for the `list` command.
#[derive(Args)]
struct ListArgs {
    /// Show only this filter
    filter: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let timeout = cli
        .timeout
        .map(|secs| Duration::try_from_secs_f64(secs).with_context(|| format!("Invalid timeout: {secs}")))
        .transpose()?;
    let session = commands::Session {
        verbose: cli.verbose,
        timeout,
        #[cfg(feature = "text")]
        font: cli.font,
    };

    match cli.command {
        Commands::Halftone(args) => commands::filter::run(FilterKind::Halftone, args, &session),
        Commands::PerlinWarp(args) => commands::filter::run(FilterKind::PerlinWarp, args, &session),
        Commands::Kaleidoscope(args) => commands::filter::run(FilterKind::Kaleidoscope, args, &session),
        Commands::Glow(args) => commands::filter::run(FilterKind::Glow, args, &session),
        Commands::Glitch(args) => commands::filter::run(FilterKind::Glitch, args, &session),
        Commands::PixelSort(args) => commands::filter::run(FilterKind::PixelSort, args, &session),
        Commands::FlowPaint(args) => commands::filter::run(FilterKind::FlowPaint, args, &session),
        Commands::ReactDiff(args) => commands::filter::run(FilterKind::ReactDiff, args, &session),
        Commands::Ascii(args) => commands::filter::run(FilterKind::Ascii, args, &session),
        Commands::Crt(args) => commands::filter::run(FilterKind::Crt, args, &session),
        Commands::OilPaint(args) => commands::filter::run(FilterKind::OilPaint, args, &session),
        Commands::Neon(args) => commands::filter::run(FilterKind::Neon, args, &session),
        Commands::Chain(args) => commands::chain::run(args, &session),
        Commands::Recipe(args) => commands::recipe::run(args, &session),
        Commands::List(args) => commands::list::run(args),
    }
}

/// Logs to stderr; `RUST_LOG` overrides the level picked by `-v`.
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_filter_has_a_subcommand() {
        let cli = Cli::command();
        for kind in FilterKind::ALL {
            let name = kind.name().replace('_', "-");
            assert!(
                cli.find_subcommand(&name).is_some(),
                "no subcommand for {kind}"
            );
        }
    }

    #[test]
    fn test_parse_filter_args() {
        let cli = Cli::try_parse_from([
            "afterglow", "-vv", "halftone", "in.png", "-o", "out.png", "-p", "cell=4", "-p", "contrast=2",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Halftone(args) => {
                assert_eq!(args.output, PathBuf::from("out.png"));
                assert_eq!(args.params, ["cell=4", "contrast=2"]);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_chain_requires_steps() {
        assert!(Cli::try_parse_from(["afterglow", "chain", "in.png", "-o", "out.png"]).is_err());
    }
}
