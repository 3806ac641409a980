//! Fish tank stereo replay tool: drives the off-axis stereo rig from eye
//! detections and prints each frame's eye cameras.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fishtank_stereo::app::{AppConfig, DetectionSource, FishTankApp};
use fishtank_stereo::config::{Config, EXAMPLE_CONFIG};
use fishtank_stereo::filters::{FilterKind, FilterSpec};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Detection log to replay (`lx ly rx ry` per line, `-` for no face)
    #[arg(long, conflicts_with = "synthetic")]
    detections: Option<PathBuf>,

    /// Replay a synthetic head sweep of this many frames
    #[arg(long)]
    synthetic: Option<usize>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Filter driving the rig (none, moving_average, single_exponential,
    /// double_exponential, one_euro), optionally with parameters such as
    /// `moving_average:10`
    #[arg(short, long)]
    filter: Option<String>,

    /// Show the output of every filter in the bank
    #[arg(long)]
    filter_all: bool,

    /// Inter-pupillary distance of the rig in meters
    #[arg(long)]
    ipd: Option<f64>,

    /// Use symmetric projection instead of off-axis
    #[arg(long)]
    no_off_axis: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Fish tank stereo");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(filter) = &args.filter {
        apply_filter_override(&mut config, filter)?;
    }
    if let Some(ipd) = args.ipd {
        config.stereo.ipd = ipd;
    }
    if args.no_off_axis {
        config.stereo.use_off_axis = false;
    }

    let detection_source = match (args.detections, args.synthetic) {
        (Some(path), _) => DetectionSource::File(path),
        (None, Some(frames)) => DetectionSource::Synthetic(frames),
        (None, None) => bail!("Either --detections or --synthetic is required"),
    };

    let app_config = AppConfig {
        detection_source,
        pipeline: config,
        show_all_filters: args.filter_all,
    };

    // Create and run application
    let mut app = FishTankApp::new(app_config).context("Failed to build tracking pipeline")?;
    let stdout = std::io::stdout();
    app.run(&mut stdout.lock())?;

    Ok(())
}

/// Replace the configured filter with `kind[:p1[:p2]]` from the command line.
/// A bare kind keeps the configured parameters.
fn apply_filter_override(config: &mut Config, filter: &str) -> Result<()> {
    if !filter.contains(':') {
        let kind: FilterKind = filter.parse()?;
        config.filter.default_filter = kind.as_str().to_string();
        return Ok(());
    }

    let spec: FilterSpec = filter.parse()?;
    config.filter.default_filter = spec.kind().as_str().to_string();
    match spec {
        FilterSpec::None => {}
        FilterSpec::MovingAverage { samples } => config.filter.samples = samples,
        FilterSpec::SingleExponential { alpha } => config.filter.se_alpha = alpha,
        FilterSpec::DoubleExponential { alpha, beta } => {
            config.filter.de_alpha = alpha;
            config.filter.de_beta = beta;
        }
        FilterSpec::OneEuro {
            frequency,
            min_cutoff,
            beta,
            d_cutoff,
        } => {
            config.filter.frequency = frequency;
            config.filter.one_euro_min_cutoff = min_cutoff;
            config.filter.one_euro_beta = beta;
            config.filter.one_euro_d_cutoff = d_cutoff;
        }
    }
    Ok(())
}
