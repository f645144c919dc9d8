//! Plan survey waypoints over a GeoJSON boundary.
//!
//! Usage:
//!   cargo run -p survey-cli --bin survey-plan -- field.geojson --spacing 15
//!   cargo run -p survey-cli --bin survey-plan -- field.geojson --resolution-m 40
//!   cargo run -p survey-cli --bin survey-plan -- road.geojson --mode line

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use survey_cli::{logging, parse_boundary, Config, PlanReport};
use survey_core::{
    normalize_boundary, sample_polyline_uniform, sample_ring_perimeter, BoundaryShape,
    CoverageModel, MovingDirection, Orientation, PlanarPoint, PlannerConfig, Projection,
    SurveyWaypoint, SweepDirection, WebMercator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Lawnmower coverage of the enclosed area
    Coverage,
    /// Evenly spaced points around the boundary ring
    Perimeter,
    /// Evenly spaced points along line geometries
    Line,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MoveArg {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SweepArg {
    Up,
    Down,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan survey waypoints over a GeoJSON boundary")]
struct Args {
    /// GeoJSON file (Geometry, Feature or FeatureCollection); `-` reads stdin
    input: PathBuf,

    #[arg(long, value_enum, default_value = "coverage")]
    mode: Mode,

    /// Line spacing in meters (defaults to SURVEY_SPACING_M or 10)
    #[arg(long)]
    spacing: Option<f64>,

    /// auto, east-west (ew) or north-south (ns)
    #[arg(long)]
    orientation: Option<Orientation>,

    #[arg(long, value_enum, default_value = "right")]
    moving: MoveArg,

    #[arg(long, value_enum, default_value = "up")]
    sweep: SweepArg,

    /// Resolution level to sample; defaults to the finest level
    #[arg(long, conflicts_with = "resolution_m")]
    level: Option<i64>,

    /// Target waypoint spacing in meters, mapped to the nearest level
    #[arg(long)]
    resolution_m: Option<f64>,

    #[arg(long)]
    max_waypoints: Option<usize>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(args.json_logs)?;

    let text = read_input(&args.input)?;
    let shape = parse_boundary(&text)?;
    let config = planner_config(&args);

    let report = match args.mode {
        Mode::Coverage => plan_coverage(&shape, &config, &args)?,
        Mode::Perimeter => plan_perimeter(&shape, &config)?,
        Mode::Line => plan_line(&shape, &config)?,
    };
    tracing::info!(
        mode = %report.mode,
        count = report.count,
        ground_length_m = report.ground_length_m,
        "Plan ready"
    );

    let out = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn planner_config(args: &Args) -> PlannerConfig {
    let mut config = Config::from_env().planner_config();
    if let Some(spacing) = args.spacing {
        config.spacing_m = spacing;
    }
    if let Some(orientation) = args.orientation {
        config.orientation = orientation;
    }
    if let Some(max_waypoints) = args.max_waypoints {
        config.max_waypoints = max_waypoints;
    }
    config.moving_direction = match args.moving {
        MoveArg::Right => MovingDirection::Right,
        MoveArg::Left => MovingDirection::Left,
    };
    config.sweep_direction = match args.sweep {
        SweepArg::Up => SweepDirection::Up,
        SweepArg::Down => SweepDirection::Down,
    };
    config
}

fn plan_coverage(shape: &BoundaryShape, config: &PlannerConfig, args: &Args) -> Result<PlanReport> {
    let model = CoverageModel::from_shape(shape, config, &WebMercator)?;
    if !model.coverage.is_complete() {
        tracing::warn!(
            visited = model.coverage.visited_cells,
            free = model.coverage.free_cells,
            "Coverage path leaves cells unvisited"
        );
    }

    let sample = match (args.level, args.resolution_m) {
        (Some(level), _) => model.sample_level(level),
        (None, Some(meters)) => model.sample_resolution(meters),
        (None, None) => model.sample_level(i64::from(model.max_level()) + 1),
    };
    let waypoints = model.to_waypoints(&sample.points, &WebMercator);

    let mut report = PlanReport::new("coverage", sample.spacing_used, waypoints);
    report.strategy = Some(model.coverage.strategy);
    report.level_used = Some(sample.level_used);
    report.max_level = Some(model.max_level());
    Ok(report)
}

fn plan_perimeter(shape: &BoundaryShape, config: &PlannerConfig) -> Result<PlanReport> {
    let ring = normalize_boundary(shape, config.spacing_m, config.min_line_buffer_m, &WebMercator);
    if ring.is_empty() {
        bail!("geometry has no boundary to trace");
    }
    let scale = planar_scale(shape);
    let points = sample_ring_perimeter(&ring, config.spacing_m * scale);
    Ok(PlanReport::new("perimeter", config.spacing_m, unproject(&points)))
}

fn plan_line(shape: &BoundaryShape, config: &PlannerConfig) -> Result<PlanReport> {
    let lines: Vec<&Vec<[f64; 2]>> = match shape {
        BoundaryShape::LineString(line) => vec![line],
        BoundaryShape::MultiLineString(lines) => lines.iter().collect(),
        _ => bail!("line mode needs a LineString or MultiLineString"),
    };
    let spacing = config.spacing_m * planar_scale(shape);
    let mut points = Vec::new();
    for line in lines {
        let projected: Vec<PlanarPoint> = line
            .iter()
            .map(|[lon, lat]| WebMercator.project(*lat, *lon))
            .collect();
        points.extend(sample_polyline_uniform(&projected, spacing));
    }
    Ok(PlanReport::new("line", config.spacing_m, unproject(&points)))
}

fn planar_scale(shape: &BoundaryShape) -> f64 {
    shape
        .mean_latitude()
        .map(|lat| WebMercator.scale_factor(lat))
        .unwrap_or(1.0)
}

fn unproject(points: &[PlanarPoint]) -> Vec<SurveyWaypoint> {
    points
        .iter()
        .map(|p| {
            let (lat, lon) = WebMercator.unproject(*p);
            SurveyWaypoint { lat, lon }
        })
        .collect()
}
