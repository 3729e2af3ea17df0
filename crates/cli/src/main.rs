//! terrashade CLI - terrain attributes and layered relief rendering

mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use render::{render, RenderConfig};
use terrashade_algorithms::terrain::{aspect, hillshade, slope, HillshadeParams, SlopeParams};
use terrashade_colormap::write_rgba_tiff;
use terrashade_core::io::{write_geotiff, GridLoader, LoadOptions, NodataRule};
use terrashade_core::{ElevationGrid, ScalarGrid};
use terrashade_parallel::TiledProcessor;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "terrashade")]
#[command(author, version, about = "Terrain attributes and layered relief rendering", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a DEM
    Info {
        /// Input DEM (GeoTIFF or Esri ASCII grid)
        input: PathBuf,
        #[command(flatten)]
        nodata: NodataArgs,
    },
    /// Terrain attributes written as float GeoTIFF
    Terrain {
        #[command(subcommand)]
        algorithm: TerrainCommands,
    },
    /// Render a layered RGBA image from a DEM
    Render {
        /// Input DEM
        input: PathBuf,
        /// Output RGBA TIFF
        output: PathBuf,
        /// JSON layer configuration (default: hillshade + terrain tint + steep slopes)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Light azimuth in degrees, overrides the configuration
        #[arg(short, long)]
        azimuth: Option<f64>,
        /// Light altitude in degrees, overrides the configuration
        #[arg(short = 'l', long)]
        altitude: Option<f64>,
        #[command(flatten)]
        nodata: NodataArgs,
    },
}

#[derive(Args)]
struct NodataArgs {
    /// No-data value, overrides the one declared by the file
    #[arg(long, allow_hyphen_values = true)]
    nodata: Option<f64>,
    /// How cells are compared with the no-data value: equal, at-or-below
    #[arg(long, default_value = "equal")]
    nodata_rule: NodataRule,
}

impl NodataArgs {
    fn loader(&self) -> GridLoader {
        GridLoader::new(LoadOptions {
            nodata: self.nodata,
            rule: self.nodata_rule,
            ..Default::default()
        })
    }
}

#[derive(Args)]
struct TerrainArgs {
    /// Input DEM
    input: PathBuf,
    /// Output GeoTIFF
    output: PathBuf,
    /// Z-factor for vertical exaggeration
    #[arg(short, long, default_value = "1.0")]
    z_factor: f64,
    /// Process in tiles of this many cells per side
    #[arg(short, long)]
    tile_size: Option<usize>,
    #[command(flatten)]
    nodata: NodataArgs,
}

// ─── Terrain subcommands ────────────────────────────────────────────────

#[derive(Subcommand)]
enum TerrainCommands {
    /// Slope in degrees
    Slope {
        #[command(flatten)]
        args: TerrainArgs,
    },
    /// Aspect as compass bearing in degrees (-1 for flat cells)
    Aspect {
        #[command(flatten)]
        args: TerrainArgs,
    },
    /// Hillshade illumination in [0, 1]
    Hillshade {
        #[command(flatten)]
        args: TerrainArgs,
        /// Light azimuth in degrees (0=North, clockwise)
        #[arg(short, long, default_value = "315")]
        azimuth: f64,
        /// Light altitude in degrees above horizon
        #[arg(short = 'l', long, default_value = "45")]
        altitude: f64,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_dem(path: &Path, nodata: &NodataArgs) -> Result<ElevationGrid> {
    let pb = spinner("Reading DEM...");
    let dem = nodata
        .loader()
        .load_masked(path)
        .with_context(|| format!("Failed to read DEM: {}", path.display()))?;
    pb.finish_and_clear();
    let (rows, cols) = dem.shape();
    debug!(rows, cols, cell_size = dem.cell_size(), nodata = ?dem.nodata(), "DEM loaded");
    Ok(dem)
}

fn write_result(grid: &ScalarGrid, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(grid, path)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// Run `kernel` on the whole DEM, or tile by tile when a tile size is given.
fn run_terrain<F>(dem: &ElevationGrid, tile_size: Option<usize>, kernel: F) -> Result<ScalarGrid>
where
    F: Fn(&ElevationGrid) -> terrashade_core::Result<ScalarGrid> + Sync + Send,
{
    let grid = match tile_size {
        Some(size) => TiledProcessor::new(size, 1)?.process(dem, kernel)?,
        None => kernel(dem)?,
    };
    Ok(grid)
}

fn terrain(algorithm: TerrainCommands) -> Result<()> {
    let (name, args, result) = match algorithm {
        TerrainCommands::Slope { args } => {
            let params = SlopeParams { z_factor: args.z_factor };
            let dem = read_dem(&args.input, &args.nodata)?;
            let start = Instant::now();
            let result = run_terrain(&dem, args.tile_size, |d| slope(d, params))
                .context("Failed to calculate slope")?;
            ("Slope", args, (result, start.elapsed()))
        }
        TerrainCommands::Aspect { args } => {
            let params = SlopeParams { z_factor: args.z_factor };
            let dem = read_dem(&args.input, &args.nodata)?;
            let start = Instant::now();
            let result = run_terrain(&dem, args.tile_size, |d| aspect(d, params))
                .context("Failed to calculate aspect")?;
            ("Aspect", args, (result, start.elapsed()))
        }
        TerrainCommands::Hillshade {
            args,
            azimuth,
            altitude,
        } => {
            let params = HillshadeParams {
                azimuth,
                altitude,
                z_factor: args.z_factor,
            };
            let dem = read_dem(&args.input, &args.nodata)?;
            let start = Instant::now();
            let result = run_terrain(&dem, args.tile_size, |d| hillshade(d, params))
                .context("Failed to calculate hillshade")?;
            ("Hillshade", args, (result, start.elapsed()))
        }
    };
    let (grid, elapsed) = result;
    write_result(&grid, &args.output)?;
    done(name, &args.output, elapsed);
    Ok(())
}

fn load_render_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config: {}", path.display()))
}

fn info_command(input: &Path, nodata: &NodataArgs) -> Result<()> {
    let dem = read_dem(input, nodata)?;
    let (rows, cols) = dem.shape();
    let bounds = dem.bounds();
    let stats = dem.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, dem.len());
    println!("Cell size: {}", dem.cell_size());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(nodata) = dem.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    if !dem.is_empty() {
        println!(
            "  Valid cells: {} ({:.1}%)",
            stats.valid_count,
            100.0 * stats.valid_count as f64 / dem.len() as f64
        );
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input, nodata } => info_command(&input, &nodata)?,

        Commands::Terrain { algorithm } => terrain(algorithm)?,

        Commands::Render {
            input,
            output,
            config,
            azimuth,
            altitude,
            nodata,
        } => {
            let mut config = load_render_config(config.as_deref())?;
            if let Some(azimuth) = azimuth {
                config.hillshade.azimuth = azimuth;
            }
            if let Some(altitude) = altitude {
                config.hillshade.altitude = altitude;
            }
            if config.layers.is_empty() {
                warn!("Render configuration has no layers");
            }
            info!(layers = config.layers.len(), "Rendering");

            let dem = read_dem(&input, &nodata)?;
            let start = Instant::now();
            let image = render(&dem, &config).context("Failed to render layers")?;
            let elapsed = start.elapsed();

            let pb = spinner("Writing image...");
            write_rgba_tiff(&image, &output)
                .with_context(|| format!("Failed to write image: {}", output.display()))?;
            pb.finish_and_clear();
            done("Image", &output, elapsed);
        }
    }

    Ok(())
}
