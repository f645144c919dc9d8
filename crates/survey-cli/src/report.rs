//! JSON report printed by `survey-plan`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use survey_core::{haversine_distance, CoverageStrategy, SurveyWaypoint};

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub generated_at: DateTime<Utc>,
    pub mode: String,
    /// Only set for coverage plans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<CoverageStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
    pub spacing_used_m: f64,
    pub count: usize,
    /// Great-circle length along the waypoints
    pub ground_length_m: f64,
    pub waypoints: Vec<SurveyWaypoint>,
}

impl PlanReport {
    pub fn new(
        mode: impl Into<String>,
        spacing_used_m: f64,
        waypoints: Vec<SurveyWaypoint>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            mode: mode.into(),
            strategy: None,
            level_used: None,
            max_level: None,
            spacing_used_m,
            count: waypoints.len(),
            ground_length_m: ground_length_m(&waypoints),
            waypoints,
        }
    }
}

pub fn ground_length_m(waypoints: &[SurveyWaypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|w| haversine_distance(w[0].lat, w[0].lon, w[1].lat, w[1].lon))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_length_sums_legs() {
        let waypoints = vec![
            SurveyWaypoint { lat: 0.0, lon: 0.0 },
            SurveyWaypoint { lat: 0.0, lon: 0.001 },
            SurveyWaypoint { lat: 0.001, lon: 0.001 },
        ];
        let length = ground_length_m(&waypoints);
        // two legs of ~111 m each
        assert!((length - 222.4).abs() < 1.0, "length {length}");
        assert_eq!(ground_length_m(&waypoints[..1]), 0.0);
    }

    #[test]
    fn test_report_omits_coverage_fields_for_traces() {
        let report = PlanReport::new("perimeter", 5.0, vec![SurveyWaypoint { lat: 1.0, lon: 2.0 }]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["mode"], "perimeter");
        assert!(json.get("strategy").is_none());
        assert!(json.get("generated_at").is_some());
    }
}
