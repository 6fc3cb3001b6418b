//! gridlines CLI: reconstruct the line grid of a photographed ruled sheet.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use gridlines::detect::run;
use gridlines::GridDetectConfig;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "gridlines")]
#[command(about = "Reconstruct the full line grid of a photographed sheet of ruled paper")]
#[command(version)]
struct Cli {
    /// Input image. Overrides `image_path` from --config.
    input: Option<PathBuf>,

    /// Output image with the reconstructed grid [default: gridlines_output.png].
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON run configuration (paths, detector and overlay parameters).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the binary mask.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Also write detected lines per family; `{axis}` becomes vertical/horizontal.
    #[arg(long)]
    axes: Option<String>,

    /// Write a JSON report (lines, spacing, timings).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Histogram bins for Otsu thresholding.
    #[arg(long)]
    bins: Option<usize>,

    /// Longest run of paper pixels a candidate line may cross.
    #[arg(long)]
    max_streak: Option<u32>,

    /// Largest endpoint gap merged into one line.
    #[arg(long)]
    cluster_tolerance: Option<i32>,

    /// Largest difference between gaps counted as the same period.
    #[arg(long)]
    spacing_tolerance: Option<f32>,

    /// Draw over the greyscale input instead of a black canvas.
    #[arg(long)]
    background: bool,

    /// Emit JSON log lines.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    log_json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> CliResult<GridDetectConfig> {
        let mut cfg = match &self.config {
            Some(path) => GridDetectConfig::load_json(path)?,
            None => GridDetectConfig::default(),
        };
        let path_string = |p: PathBuf| p.display().to_string();

        if let Some(input) = self.input {
            cfg.image_path = path_string(input);
        }
        if cfg.image_path.is_empty() {
            return Err("no input image: pass INPUT or set image_path in --config".into());
        }
        if let Some(p) = self.output {
            cfg.output_path = Some(path_string(p));
        }
        if let Some(p) = self.mask {
            cfg.mask_path = Some(path_string(p));
        }
        if let Some(p) = self.axes {
            cfg.axes_path = Some(p);
        }
        if let Some(p) = self.report {
            cfg.report_path = Some(path_string(p));
        }
        if let Some(v) = self.bins {
            cfg.params.threshold.num_bins = v;
        }
        if let Some(v) = self.max_streak {
            cfg.params.scan.max_streak = v;
        }
        if let Some(v) = self.cluster_tolerance {
            cfg.params.cluster.tolerance = v;
        }
        if let Some(v) = self.spacing_tolerance {
            cfg.params.spacing.tolerance = v;
        }
        if self.background {
            cfg.overlay.background = true;
        }
        Ok(cfg)
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> CliResult<()> {
    // A second logger (e.g. in tests) is not an error.
    let _ = tracing_log::LogTracer::init();
    gridlines::core::init_tracing(
        cli.log_json,
        gridlines::core::level_from_verbosity(cli.verbose),
    );
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> CliResult<()> {
    gridlines::core::init_with_level(gridlines::core::level_from_verbosity(cli.verbose))?;
    Ok(())
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let cfg = cli.into_config()?;
    let report = run(&cfg)?;

    let period = report.spacing.as_ref().and_then(|s| s.period());
    let count = |axis: &Option<gridlines::detect_lines::AxisReport>| {
        axis.as_ref().map_or(0, |a| a.detected + a.interpolated + a.extrapolated)
    };
    match period {
        Some(p) => println!(
            "period {p:.1} px: {} vertical, {} horizontal lines",
            count(&report.vertical),
            count(&report.horizontal)
        ),
        None => println!("no grid period found; wrote detected lines only"),
    }
    println!("wrote grid to {}", cfg.output_path().display());
    Ok(())
}
