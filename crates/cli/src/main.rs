//! sectorgrid CLI - sector-based nearest-neighbor gridding

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use sectorgrid_core::io::write_geotiff;
use sectorgrid_core::{DistanceUnit, Geometry, GridDomain, Registration};
use sectorgrid_engine::{Gridder, GridderParams, Gridding};

mod reader;
use reader::RecordReader;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "sectorgrid")]
#[command(
    author,
    version,
    about = "Grid scattered observations by sector-based nearest-neighbor search",
    long_about = None
)]
struct Cli {
    /// Input table of x y z [w] records (use - for stdin)
    input: PathBuf,

    /// Output grid file (GeoTIFF)
    #[arg(short, long)]
    output: PathBuf,

    /// Grid region as west/east/south/north
    #[arg(short = 'R', long)]
    region: String,

    /// Grid increments as xinc[/yinc]
    #[arg(short = 'I', long)]
    increment: String,

    /// Search radius, with optional unit suffix:
    /// e meters, k km, M miles, n nautical miles, f feet, d arc degrees
    #[arg(short = 'S', long)]
    radius: String,

    /// Sectors around each node, optionally with the minimum number that
    /// must be filled, as sectors[/min]
    #[arg(short = 'N', long, default_value = "4")]
    sectors: String,

    /// Value written to nodes that cannot be filled
    #[arg(short = 'E', long, default_value_t = f64::NAN)]
    empty: f64,

    /// Read observation weights from a fourth input column
    #[arg(short = 'W', long)]
    weights: bool,

    /// Pixel (cell-center) registration instead of gridline
    #[arg(short = 'p', long)]
    pixel: bool,

    /// Treat coordinates as geographic lon/lat degrees (implied by a
    /// spherical radius unit)
    #[arg(short = 'g', long)]
    geographic: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ─── Gridding run ───────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();

    let (west, east, south, north) = parse_region(&cli.region)?;
    let (x_inc, y_inc) = parse_increment(&cli.increment)?;
    let (radius, mut unit) = parse_radius(&cli.radius)?;
    let (sectors, min_sectors) = parse_sectors(&cli.sectors)?;

    if cli.geographic && unit == DistanceUnit::Cartesian {
        unit = DistanceUnit::Degrees;
    }
    let registration = if cli.pixel {
        Registration::Pixel
    } else {
        Registration::Gridline
    };
    let domain = if unit.is_geographic() {
        GridDomain::geographic(west, east, south, north, x_inc, y_inc, registration)?
    } else {
        GridDomain::cartesian(west, east, south, north, x_inc, y_inc, registration)?
    };
    info!(
        rows = domain.n_rows(),
        cols = domain.n_columns(),
        periodic_x = domain.periodic_x,
        "grid domain ready"
    );

    let geometry = Geometry::new(domain, unit)?;
    let params = GridderParams {
        radius,
        sectors,
        min_sectors,
        empty_value: cli.empty,
        use_weights: cli.weights,
    };
    let mut gridder = Gridder::new(geometry, params)?;

    // ─── Input scan ─────────────────────────────────────────────────────

    let source: Box<dyn BufRead> = if cli.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("cannot open {}", cli.input.display()))?;
        Box::new(BufReader::new(file))
    };
    let mut records = RecordReader::new(source);

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::with_template("{spinner} {pos} records").unwrap());
    while let Some(rec) = records.next_record()? {
        let w = match (cli.weights, rec.w) {
            (true, Some(w)) => w,
            (true, None) => bail!(
                "line {}: --weights requires a fourth input column",
                records.line_no()
            ),
            (false, _) => 1.0,
        };
        gridder.add(rec.x, rec.y, rec.z, w);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        lines = records.line_no(),
        accepted = gridder.len(),
        rejected = gridder.rejected(),
        "input scan complete"
    );
    if gridder.is_empty() {
        warn!("no usable observations; the output grid will be empty");
    }

    // ─── Search, reduce, write ──────────────────────────────────────────

    let Gridding { grid, report } = gridder.grid()?;

    info!(
        filled = report.filled,
        below_min_sectors = report.below_min_sectors,
        empty = report.empty,
        "node coverage"
    );
    let stats = grid.statistics();
    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        info!(min, max, mean = stats.mean.unwrap_or(f64::NAN), "output range");
    }

    write_geotiff(&grid, &cli.output)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        output = %cli.output.display(),
        "grid written"
    );

    Ok(())
}

// ─── Option parsing ─────────────────────────────────────────────────────

fn parse_region(s: &str) -> Result<(f64, f64, f64, f64)> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 4 {
        bail!("region must be west/east/south/north, got {s:?}");
    }
    let mut bounds = [0.0f64; 4];
    for (slot, part) in bounds.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("bad region bound {part:?}"))?;
    }
    Ok((bounds[0], bounds[1], bounds[2], bounds[3]))
}

fn parse_increment(s: &str) -> Result<(f64, f64)> {
    match s.split_once('/') {
        Some((x, y)) => Ok((
            x.parse().with_context(|| format!("bad x increment {x:?}"))?,
            y.parse().with_context(|| format!("bad y increment {y:?}"))?,
        )),
        None => {
            let inc = s.parse().with_context(|| format!("bad increment {s:?}"))?;
            Ok((inc, inc))
        }
    }
}

fn parse_radius(s: &str) -> Result<(f64, DistanceUnit)> {
    let (number, unit) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - 1], DistanceUnit::from_suffix(c)?),
        _ => (s, DistanceUnit::Cartesian),
    };
    let radius = number
        .parse()
        .with_context(|| format!("bad search radius {s:?}"))?;
    Ok((radius, unit))
}

fn parse_sectors(s: &str) -> Result<(u32, Option<u32>)> {
    match s.split_once('/') {
        Some((n, m)) => Ok((
            n.parse()
                .with_context(|| format!("bad sector count {n:?}"))?,
            Some(
                m.parse()
                    .with_context(|| format!("bad minimum sector count {m:?}"))?,
            ),
        )),
        None => Ok((
            s.parse()
                .with_context(|| format!("bad sector count {s:?}"))?,
            None,
        )),
    }
}
