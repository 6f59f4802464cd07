//! Agent snapshots and scores

use serde::{Deserialize, Serialize};

/// Read-only fitness profile of one agent at routing time
///
/// All values are pre-aggregated by the caller. `geography_fit`,
/// `price_band_fit` and `kept_appt_rate` are expected in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    pub user_id: String,
    /// Target number of open leads
    pub capacity_target: i64,
    /// Current open-lead count
    pub active_pipeline: u32,
    #[serde(default)]
    pub geography_fit: f64,
    #[serde(default)]
    pub price_band_fit: f64,
    #[serde(default)]
    pub kept_appt_rate: f64,
    /// Agent may contact leads on consented channels
    #[serde(default)]
    pub consent_ready: bool,
    /// Agent's outbound SMS number is 10DLC registered
    #[serde(default)]
    pub ten_dlc_ready: bool,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub round_robin_order: Option<u32>,
}

impl AgentSnapshot {
    /// Compliance gates. An agent failing either is never routed to.
    pub fn is_eligible(&self) -> bool {
        self.consent_ready && self.ten_dlc_ready
    }

    /// Normalized remaining capacity in [0, 1]
    pub fn capacity_headroom(&self) -> f64 {
        if self.capacity_target <= 0 {
            return 0.0;
        }
        let target = self.capacity_target as f64;
        ((target - f64::from(self.active_pipeline)) / target).clamp(0.0, 1.0)
    }
}

/// Factor contributing to an agent score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonKind {
    Capacity,
    Performance,
    Geography,
    PriceBand,
}

impl ReasonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capacity => "CAPACITY",
            Self::Performance => "PERFORMANCE",
            Self::Geography => "GEOGRAPHY",
            Self::PriceBand => "PRICE_BAND",
        }
    }
}

/// One term of a score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReason {
    pub kind: ReasonKind,
    /// Effective weight (config weight times importance, where applicable)
    pub weight: f64,
    /// Raw factor value before weighting
    pub value: f64,
    /// `weight * value`
    pub contribution: f64,
}

impl ScoreReason {
    pub fn new(kind: ReasonKind, weight: f64, value: f64) -> Self {
        Self {
            kind,
            weight,
            value,
            contribution: weight * value,
        }
    }
}

/// Scored, eligible agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentScore {
    pub user_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    pub score: f64,
    pub active_pipeline: u32,
    pub reasons: Vec<ScoreReason>,
}

impl AgentScore {
    /// Reason entry for a factor, if present
    pub fn reason(&self, kind: ReasonKind) -> Option<&ScoreReason> {
        self.reasons.iter().find(|r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(target: i64, pipeline: u32) -> AgentSnapshot {
        AgentSnapshot {
            user_id: "agent".to_string(),
            capacity_target: target,
            active_pipeline: pipeline,
            geography_fit: 0.0,
            price_band_fit: 0.0,
            kept_appt_rate: 0.0,
            consent_ready: true,
            ten_dlc_ready: true,
            team_id: None,
            round_robin_order: None,
        }
    }

    #[test]
    fn test_capacity_headroom() {
        assert!((snapshot(10, 2).capacity_headroom() - 0.8).abs() < 1e-9);
        assert_eq!(snapshot(10, 0).capacity_headroom(), 1.0);
        // Over capacity clamps to zero
        assert_eq!(snapshot(10, 15).capacity_headroom(), 0.0);
    }

    #[test]
    fn test_capacity_headroom_non_positive_target() {
        assert_eq!(snapshot(0, 0).capacity_headroom(), 0.0);
        assert_eq!(snapshot(-5, 1).capacity_headroom(), 0.0);
    }

    #[test]
    fn test_eligibility_requires_both_gates() {
        let mut agent = snapshot(10, 0);
        assert!(agent.is_eligible());

        agent.ten_dlc_ready = false;
        assert!(!agent.is_eligible());

        agent.ten_dlc_ready = true;
        agent.consent_ready = false;
        assert!(!agent.is_eligible());
    }

    #[test]
    fn test_score_reason_contribution() {
        let reason = ScoreReason::new(ReasonKind::Geography, 0.06, 0.5);
        assert!((reason.contribution - 0.03).abs() < 1e-12);
        assert_eq!(reason.kind.as_str(), "GEOGRAPHY");
    }
}
