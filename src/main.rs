// CLI entry for colorific
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use colorific::{run_files, run_stream, BatchConfig, DistanceMetric, PaletteConfig};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "colorific",
    version,
    about = "Detect the color palette of images",
    long_about = "Detect the color palette of each image given on the command line, or of each \
                  filename read from stdin (one per line). Prints one tab-separated line per \
                  image: filename, colors, background."
)]
struct Cli {
    /// Number of worker threads; 0 uses one per CPU
    #[arg(short = 'p', long = "parallel")]
    parallel: Option<usize>,

    /// Minimum HSV saturation (0-1) for a color to be kept
    #[arg(long = "min-saturation")]
    min_saturation: Option<f64>,

    /// Maximum number of colors to report
    #[arg(long = "max-colors")]
    max_colors: Option<usize>,

    /// Perceptual distance below which colors merge
    #[arg(long = "min-distance")]
    min_distance: Option<f64>,

    /// Fraction of the top color's prominence a color needs
    #[arg(long = "min-prominence")]
    min_prominence: Option<f64>,

    /// Adaptive palette size before clustering
    #[arg(long = "n-quantized")]
    n_quantized: Option<usize>,

    /// Prominence at which the top color becomes the background
    #[arg(long = "background-threshold")]
    background_threshold: Option<f64>,

    /// Perceptual distance metric (cmc or ciede2000)
    #[arg(long = "distance")]
    distance: Option<DistanceMetric>,

    /// JSON configuration used as the base for the flags above
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Save a palette swatch image next to each input
    #[arg(short = 'o', long = "output-palette", action = ArgAction::SetTrue)]
    save_palette: bool,

    /// Give up on an image after this many seconds
    #[arg(long = "timeout")]
    timeout: Option<f64>,

    /// Images to analyze; stdin is read when none are given
    #[arg(value_hint = ValueHint::FilePath)]
    files: Vec<String>,
}

fn build_palette_config(cli: &Cli) -> Result<PaletteConfig> {
    let mut cfg = match &cli.config {
        Some(path) => PaletteConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PaletteConfig::default(),
    };
    if let Some(v) = cli.min_saturation { cfg.min_saturation = v; }
    if let Some(v) = cli.max_colors { cfg.max_colors = v; }
    if let Some(v) = cli.min_distance { cfg.min_distance = v; }
    if let Some(v) = cli.min_prominence { cfg.min_prominence = v; }
    if let Some(v) = cli.n_quantized { cfg.quantize_levels = v; }
    if let Some(v) = cli.background_threshold { cfg.background_threshold = v; }
    if let Some(v) = cli.distance { cfg.distance = v; }
    cfg.validate()?;
    Ok(cfg)
}

fn build_batch_config(cli: &Cli) -> Result<BatchConfig> {
    let mut cfg = match cli.parallel {
        Some(n) => BatchConfig::with_workers(n),
        None => BatchConfig::default(),
    };
    cfg.save_palette = cli.save_palette;
    if let Some(secs) = cli.timeout {
        match Duration::try_from_secs_f64(secs) {
            Ok(limit) if !limit.is_zero() => cfg.item_timeout = Some(limit),
            _ => bail!("--timeout must be a positive number of seconds, got {}", secs),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let palette_config = build_palette_config(&cli)?;
    let batch_config = build_batch_config(&cli)?;

    let stdout = io::stdout();
    let summary = if cli.files.is_empty() {
        run_stream(BufReader::new(io::stdin()), stdout, &palette_config, &batch_config)?
    } else {
        run_files(cli.files, stdout, &palette_config, &batch_config)?
    };

    if summary.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{} of {} images failed ({} timed out)",
            summary.failed + summary.timed_out,
            summary.total(),
            summary.timed_out
        );
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_zero_uses_every_cpu() {
        let cli = Cli::parse_from(["colorific", "-p", "0", "a.png"]);
        let cfg = build_batch_config(&cli).unwrap();
        assert_eq!(cfg.workers, BatchConfig::all_cpus().workers);
        assert!(cfg.workers >= 1);
    }

    #[test]
    fn test_positional_names_are_kept_verbatim() {
        let cli = Cli::parse_from(["colorific", " padded.png ", "two\nlines.png"]);
        assert_eq!(cli.files, vec![" padded.png ".to_string(), "two\nlines.png".to_string()]);
        assert_eq!(build_batch_config(&cli).unwrap().workers, 1);
    }
}
