//! End-to-end coverage planning scenarios.
//!
//! Run with: cargo test -p survey-core --test coverage_test

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use survey_core::{
    close_ring, plan_coverage_path, BoundaryShape, CoverageModel, CoverageStrategy, Orientation,
    PlanarPoint, PlannerConfig, PlanningError, ResolutionConfig, ResolutionModel, SweepParams,
    WebMercator,
};

fn square(size: f64) -> Vec<PlanarPoint> {
    vec![
        PlanarPoint::new(0.0, 0.0),
        PlanarPoint::new(size, 0.0),
        PlanarPoint::new(size, size),
        PlanarPoint::new(0.0, size),
        PlanarPoint::new(0.0, 0.0),
    ]
}

/// Two 10 m wide arms rising from a 30 x 10 m base.
fn u_shape() -> Vec<PlanarPoint> {
    vec![
        PlanarPoint::new(0.0, 0.0),
        PlanarPoint::new(30.0, 0.0),
        PlanarPoint::new(30.0, 30.0),
        PlanarPoint::new(20.0, 30.0),
        PlanarPoint::new(20.0, 10.0),
        PlanarPoint::new(10.0, 10.0),
        PlanarPoint::new(10.0, 30.0),
        PlanarPoint::new(0.0, 30.0),
        PlanarPoint::new(0.0, 0.0),
    ]
}

fn inside_u(p: &PlanarPoint) -> bool {
    let eps = 1e-6;
    let in_base = p.x >= -eps && p.x <= 30.0 + eps && p.y >= -eps && p.y <= 10.0 + eps;
    let in_arm = p.y >= -eps
        && p.y <= 30.0 + eps
        && ((p.x >= -eps && p.x <= 10.0 + eps) || (p.x >= 20.0 - eps && p.x <= 30.0 + eps));
    in_base || in_arm
}

fn star_polygon(rng: &mut StdRng) -> Vec<PlanarPoint> {
    let vertices = rng.random_range(5..14);
    let cx = rng.random_range(-500.0..500.0);
    let cy = rng.random_range(-500.0..500.0);
    let ring: Vec<PlanarPoint> = (0..vertices)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / vertices as f64;
            let radius = rng.random_range(20.0..60.0);
            PlanarPoint::new(cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    close_ring(&ring)
}

fn assert_model_invariants(model: &ResolutionModel) {
    let turns = &model.turn_distances;
    assert_eq!(turns.first(), Some(&0.0));
    assert_eq!(turns.last(), Some(&model.total_length));
    assert!(turns.windows(2).all(|w| w[1] > w[0]), "turn distances must ascend");

    // sampling merges distances closer than a millionth of the spacing
    let tol = model.max_spacing * 1e-6 + 1e-6;
    for level in 1..=i64::from(model.max_level) + 1 {
        let distances = model.sample_distances(level);
        assert!(distances.windows(2).all(|w| w[1] >= w[0]));
        for turn in turns {
            assert!(
                distances.iter().any(|d| (d - turn).abs() <= tol),
                "turn at {turn} missing from level {level}"
            );
        }
    }
}

#[test]
fn test_square_scenario() {
    let params = SweepParams {
        spacing_m: 2.0,
        ..SweepParams::default()
    };
    let path = plan_coverage_path(&square(10.0), &params).unwrap();
    assert_eq!(path.strategy, CoverageStrategy::Boustrophedon);
    assert_eq!(path.visited_cells, path.free_cells);

    let mut rows: Vec<f64> = path.points.iter().map(|p| p.y).collect();
    rows.sort_by(f64::total_cmp);
    rows.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    assert!(rows.len() >= 5, "expected at least 5 rows, got {}", rows.len());

    let model = ResolutionModel::build(&path.points, &ResolutionConfig::default());
    assert!(model.turn_distances.len() >= 10);
    assert_model_invariants(&model);
}

#[test]
fn test_grid_too_large() {
    let params = SweepParams {
        spacing_m: 0.5,
        ..SweepParams::default()
    };
    match plan_coverage_path(&square(2_000.0), &params) {
        Err(PlanningError::GridTooLarge { width, height }) => {
            assert!(width * height > 3_000_000);
        }
        other => panic!("expected GridTooLarge, got {other:?}"),
    }

    let config = PlannerConfig::with_spacing(0.5);
    assert!(CoverageModel::build(&square(2_000.0), &config).is_err());
}

#[test]
fn test_short_boundary_gives_degenerate_model() {
    let empty = ResolutionModel::build(&[], &ResolutionConfig::default());
    assert_eq!(empty.max_level, 0);
    assert_eq!(empty.total_length, 0.0);

    let point = [PlanarPoint::new(3.0, 4.0)];
    let single = ResolutionModel::build(&point, &ResolutionConfig::default());
    assert_eq!(single.max_level, 0);
    assert_eq!(single.total_length, 0.0);

    let model = CoverageModel::build(&point, &PlannerConfig::default()).unwrap();
    assert_eq!(model.coverage.strategy, CoverageStrategy::Empty);
    assert_eq!(model.sample_level(1).count, 0);
}

#[test]
fn test_spacing_shrinks_with_level() {
    let model = CoverageModel::build(&square(40.0), &PlannerConfig::with_spacing(4.0)).unwrap();
    assert!(model.max_level() > 0);
    let mut previous = f64::INFINITY;
    for level in 1..=i64::from(model.max_level()) + 1 {
        let sample = model.sample_level(level);
        assert_eq!(sample.level_used as i64, level);
        assert!(sample.spacing_used <= previous);
        assert_eq!(sample.count, sample.points.len());
        previous = sample.spacing_used;
    }
    let last = model.sample_level(i64::from(model.max_level()) + 1);
    assert!((last.spacing_used - model.resolution.min_spacing).abs() < 1e-9);
}

#[test]
fn test_concave_boundary_uses_fallback() {
    let params = SweepParams {
        spacing_m: 2.0,
        orientation: Orientation::EastWest,
        ..SweepParams::default()
    };
    let path = plan_coverage_path(&u_shape(), &params).unwrap();
    assert_eq!(path.strategy, CoverageStrategy::RowFallback);
    assert_eq!(path.visited_cells, path.free_cells);
    assert!(!path.points.is_empty());
    assert!(path.points.iter().all(inside_u));
    // both arms reach the top
    assert!(path.points.iter().any(|p| p.x <= 10.0 && (p.y - 30.0).abs() < 1e-6));
    assert!(path.points.iter().any(|p| p.x >= 20.0 && (p.y - 30.0).abs() < 1e-6));
}

#[test]
fn test_random_polygons_are_fully_covered() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..25 {
        let ring = star_polygon(&mut rng);
        let config = PlannerConfig {
            spacing_m: rng.random_range(3.0..8.0),
            orientation: match rng.random_range(0..3) {
                0 => Orientation::Auto,
                1 => Orientation::EastWest,
                _ => Orientation::NorthSouth,
            },
            ..PlannerConfig::default()
        };
        let model = CoverageModel::build(&ring, &config).unwrap();
        let coverage = &model.coverage;
        assert_ne!(coverage.strategy, CoverageStrategy::Empty);
        assert!(coverage.free_cells > 0);
        assert_eq!(coverage.visited_cells, coverage.free_cells);
        assert!(coverage.points.iter().all(|p| p.is_finite()));
        assert_model_invariants(&model.resolution);
    }
}

#[test]
fn test_geographic_polygon_round_trip() {
    let shape: BoundaryShape = serde_json::from_str(
        r#"{
            "type": "Polygon",
            "coordinates": [[
                [-117.8280, 33.6840], [-117.8260, 33.6840],
                [-117.8260, 33.6855], [-117.8280, 33.6855], [-117.8280, 33.6840]
            ]]
        }"#,
    )
    .unwrap();
    let config = PlannerConfig::with_spacing(20.0);
    let model = CoverageModel::from_shape(&shape, &config, &WebMercator).unwrap();
    assert!(model.planar_scale > 1.1 && model.planar_scale < 1.3);
    assert!(model.coverage.is_complete());

    let sample = model.sample_level(i64::from(model.max_level()) + 1);
    assert!(sample.count > 4);
    let waypoints = model.to_waypoints(&sample.points, &WebMercator);
    for wp in &waypoints {
        assert!(wp.lat > 33.6839 && wp.lat < 33.6856, "lat {}", wp.lat);
        assert!(wp.lon > -117.8281 && wp.lon < -117.8259, "lon {}", wp.lon);
    }

    let coarse = model.sample_level(1);
    let level = model.level_for_resolution(coarse.spacing_used);
    assert_eq!(level, 1);
    assert_eq!(model.sample_resolution(coarse.spacing_used).count, coarse.count);
}

#[test]
fn test_finest_step_floor_is_in_ground_meters() {
    // ~11 m square at 60°N, where one ground meter spans two Mercator units
    let (lat0, lon0) = (60.0, 10.0);
    let (dlat, dlon) = (0.0000989, 0.000198);
    let shape = BoundaryShape::Polygon(vec![vec![
        [lon0, lat0],
        [lon0 + dlon, lat0],
        [lon0 + dlon, lat0 + dlat],
        [lon0, lat0 + dlat],
        [lon0, lat0],
    ]]);
    let config = PlannerConfig {
        spacing_m: 2.0,
        max_waypoints: 100_000,
        ..PlannerConfig::default()
    };
    let model = CoverageModel::from_shape(&shape, &config, &WebMercator).unwrap();
    assert!((model.planar_scale - 2.0).abs() < 1e-3);
    assert!(model.max_level() > 0);

    let finest = model.sample_level(i64::from(model.max_level()) + 1);
    assert!(
        finest.spacing_used >= config.min_base_step_m - 1e-9,
        "finest spacing {} m",
        finest.spacing_used
    );
}

#[test]
fn test_line_corridor_is_covered() {
    let shape = BoundaryShape::LineString(vec![[-117.8280, 33.6840], [-117.8250, 33.6850]]);
    let config = PlannerConfig::with_spacing(10.0);
    let model = CoverageModel::from_shape(&shape, &config, &WebMercator).unwrap();
    assert_ne!(model.coverage.strategy, CoverageStrategy::Empty);
    assert!(model.coverage.is_complete());
    assert_model_invariants(&model.resolution);
}

proptest! {
    #[test]
    fn test_close_ring_is_idempotent(
        coords in proptest::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 1..20)
    ) {
        let ring: Vec<PlanarPoint> = coords.into_iter().map(PlanarPoint::from).collect();
        let once = close_ring(&ring);
        prop_assert_eq!(once.first(), once.last());
        prop_assert_eq!(close_ring(&once), once);
    }
}
