//! Flight metrics: summary values collected from one benchmark run.

use serde::{Deserialize, Serialize};
use skyward_sim::{BranchOutcome, FlightData};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightMetrics {
    pub scenario: String,
    pub seed: u64,
    /// Maximum altitude of the main branch (m).
    pub apogee: f64,
    pub time_to_apogee: f64,
    /// m/s
    pub max_velocity: f64,
    /// m/s²
    pub max_acceleration: f64,
    pub flight_time: f64,
    pub ground_hit_velocity: f64,
    pub branches: usize,
    /// Distinct warnings across all branches.
    pub warnings: usize,
    /// Branches that ended in an abort or a hard error.
    pub aborted_branches: usize,
    /// Wall-clock time of the whole run (s).
    pub wall_time: f64,
}

impl FlightMetrics {
    pub fn from_flight_data(scenario: &str, seed: u64, data: &FlightData, wall_time: f64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            apogee: data.max_altitude(),
            time_to_apogee: data.time_to_apogee(),
            max_velocity: data.max_velocity(),
            max_acceleration: data.max_acceleration(),
            flight_time: data.flight_time(),
            ground_hit_velocity: data.ground_hit_velocity(),
            branches: data.branch_count(),
            warnings: data.warnings().len(),
            aborted_branches: data
                .outcomes()
                .iter()
                .filter(|outcome| !matches!(outcome, BranchOutcome::Completed))
                .count(),
            wall_time,
        }
    }

    pub fn to_csv_header() -> String {
        "scenario,seed,apogee_m,time_to_apogee_s,max_velocity_ms,max_acceleration_ms2,flight_time_s,ground_hit_velocity_ms,branches,warnings,aborted_branches,wall_time_ms".to_string()
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{},{},{},{:.3}",
            self.scenario,
            self.seed,
            self.apogee,
            self.time_to_apogee,
            self.max_velocity,
            self.max_acceleration,
            self.flight_time,
            self.ground_hit_velocity,
            self.branches,
            self.warnings,
            self.aborted_branches,
            self.wall_time * 1000.0,
        )
    }

    /// Header plus one row per run.
    pub fn to_csv(metrics: &[FlightMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
