use serde::Serialize;

/// Versioned weight table for the recommendation score. Any change to these numbers changes
/// every ranking, so a new table gets a new version tag instead of editing `V1` in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub version: &'static str,
    pub completion_rate: f64,
    pub average_rating: f64,
    pub response_time: f64,
    pub on_time_delivery: f64,
    pub cancellation: f64,
    pub proximity: f64,
    pub workload: f64,
    pub priority_bonus: f64,
    /// Bonus applies when the driver's priority score is strictly above this value.
    pub priority_bonus_threshold: u8,
    /// Minutes at which the response sub-score reaches zero.
    pub response_time_ceiling_minutes: f64,
    /// Kilometres at which the proximity sub-score reaches zero.
    pub proximity_ceiling_km: f64,
    /// Active orders at which the workload sub-score reaches zero.
    pub workload_ceiling: f64,
}

impl ScoringWeights {
    pub const V1: ScoringWeights = ScoringWeights {
        version: "v1",
        completion_rate: 0.25,
        average_rating: 0.20,
        response_time: 0.15,
        on_time_delivery: 0.15,
        cancellation: 0.10,
        proximity: 0.10,
        workload: 0.05,
        priority_bonus: 10.0,
        priority_bonus_threshold: 80,
        response_time_ceiling_minutes: 60.0,
        proximity_ceiling_km: 10.0,
        workload_ceiling: 5.0,
    };

    pub fn factor_weight_sum(&self) -> f64 {
        self.completion_rate
            + self.average_rating
            + self.response_time
            + self.on_time_delivery
            + self.cancellation
            + self.proximity
            + self.workload
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::V1
    }
}
