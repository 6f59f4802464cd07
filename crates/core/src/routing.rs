//! Routing input, weights and result

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::agent::{AgentScore, AgentSnapshot};
use crate::error::{Error, Result};

/// Scoring weights and acceptance floor
///
/// The four factor weights are expected to sum to 1.0. This is not
/// enforced here and scores are never renormalized; rule-authoring
/// validation reports a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingConfig {
    #[serde(default = "default_minimum_score", alias = "minimum_score")]
    pub minimum_score: f64,
    #[serde(default = "default_performance_weight", alias = "performance_weight")]
    pub performance_weight: f64,
    #[serde(default = "default_capacity_weight", alias = "capacity_weight")]
    pub capacity_weight: f64,
    #[serde(default = "default_geography_weight", alias = "geography_weight")]
    pub geography_weight: f64,
    #[serde(default = "default_price_band_weight", alias = "price_band_weight")]
    pub price_band_weight: f64,
}

fn default_minimum_score() -> f64 {
    0.0
}

fn default_performance_weight() -> f64 {
    0.25
}

fn default_capacity_weight() -> f64 {
    0.35
}

fn default_geography_weight() -> f64 {
    0.2
}

fn default_price_band_weight() -> f64 {
    0.2
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            minimum_score: default_minimum_score(),
            performance_weight: default_performance_weight(),
            capacity_weight: default_capacity_weight(),
            geography_weight: default_geography_weight(),
            price_band_weight: default_price_band_weight(),
        }
    }
}

impl RoutingConfig {
    /// Sum of the four factor weights
    pub fn weight_sum(&self) -> f64 {
        self.performance_weight + self.capacity_weight + self.geography_weight + self.price_band_weight
    }

    pub fn with_minimum_score(mut self, minimum_score: f64) -> Self {
        self.minimum_score = minimum_score;
        self
    }
}

/// Per-lead importance multipliers for the fit factors, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Importances {
    pub geography: f64,
    pub price_band: f64,
}

/// Everything the router needs for one lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingInput {
    pub lead_id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub geography_importance: f64,
    #[serde(default)]
    pub price_band_importance: f64,
    #[serde(default)]
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub config: Option<RoutingConfig>,
    #[serde(default)]
    pub fallback_team_id: Option<String>,
    #[serde(default)]
    pub quiet_hours: bool,
}

impl RoutingInput {
    pub fn new(lead_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            tenant_id: tenant_id.into(),
            geography_importance: 0.0,
            price_band_importance: 0.0,
            agents: Vec::new(),
            config: None,
            fallback_team_id: None,
            quiet_hours: false,
        }
    }

    pub fn importances(&self) -> Importances {
        Importances {
            geography: self.geography_importance,
            price_band: self.price_band_importance,
        }
    }

    /// Config to score with, falling back to the defaults
    pub fn effective_config(&self) -> RoutingConfig {
        self.config.unwrap_or_default()
    }

    /// Structural checks for inputs arriving over a transport
    ///
    /// Routing itself never calls this; a malformed input is a caller bug
    /// and should be rejected before it reaches the router.
    pub fn validate(&self) -> Result<()> {
        if self.lead_id.trim().is_empty() {
            return Err(Error::InvalidInput {
                field: "leadId".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.tenant_id.trim().is_empty() {
            return Err(Error::InvalidInput {
                field: "tenantId".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        check_unit_interval("geographyImportance", self.geography_importance)?;
        check_unit_interval("priceBandImportance", self.price_band_importance)?;

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.user_id.as_str()) {
                return Err(Error::DuplicateAgent(agent.user_id.clone()));
            }
        }
        Ok(())
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidInput {
            field: field.to_string(),
            message: format!("Must be between 0.0 and 1.0, got {}", value),
        });
    }
    Ok(())
}

/// Routing decision for one lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResult {
    pub lead_id: String,
    pub tenant_id: String,
    /// Ranked, best first
    pub selected_agents: Vec<AgentScore>,
    pub used_fallback: bool,
    #[serde(default)]
    pub fallback_team_id: Option<String>,
    /// Passed through from the input. The assignment layer must honour it.
    pub quiet_hours: bool,
}

impl RoutingResult {
    /// Fallback result carrying no agents
    pub fn fallback(input: &RoutingInput) -> Self {
        Self {
            lead_id: input.lead_id.clone(),
            tenant_id: input.tenant_id.clone(),
            selected_agents: Vec::new(),
            used_fallback: true,
            fallback_team_id: input.fallback_team_id.clone(),
            quiet_hours: input.quiet_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str) -> AgentSnapshot {
        AgentSnapshot {
            user_id: id.to_string(),
            capacity_target: 10,
            active_pipeline: 0,
            geography_fit: 0.5,
            price_band_fit: 0.5,
            kept_appt_rate: 0.5,
            consent_ready: true,
            ten_dlc_ready: true,
            team_id: None,
            round_robin_order: None,
        }
    }

    #[test]
    fn test_default_weights() {
        let config = RoutingConfig::default();
        assert_eq!(config.minimum_score, 0.0);
        assert_eq!(config.performance_weight, 0.25);
        assert_eq!(config.capacity_weight, 0.35);
        assert!((config.weight_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RoutingConfig = serde_json::from_str(r#"{"minimumScore": 0.9}"#).unwrap();
        assert_eq!(config.minimum_score, 0.9);
        assert_eq!(config.geography_weight, 0.2);
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        assert!(serde_json::from_str::<RoutingConfig>(r#"{"minScore": 0.9}"#).is_err());
        // Lowercased camelCase, as the config crate produces
        assert!(serde_json::from_str::<RoutingConfig>(r#"{"minimumscore": 0.9}"#).is_err());

        let config: RoutingConfig = serde_json::from_str(r#"{"minimum_score": 0.9}"#).unwrap();
        assert_eq!(config.minimum_score, 0.9);
    }

    #[test]
    fn test_unknown_input_key_rejected() {
        let json = r#"{"leadId": "lead-1", "tenantId": "tenant-1", "quietHour": true}"#;
        assert!(serde_json::from_str::<RoutingInput>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_importance() {
        let mut input = RoutingInput::new("lead-1", "tenant-1");
        input.geography_importance = 1.2;
        assert!(matches!(
            input.validate(),
            Err(Error::InvalidInput { ref field, .. }) if field == "geographyImportance"
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_agents() {
        let mut input = RoutingInput::new("lead-1", "tenant-1");
        input.agents = vec![agent("a"), agent("b"), agent("a")];
        assert!(matches!(input.validate(), Err(Error::DuplicateAgent(id)) if id == "a"));
    }

    #[test]
    fn test_fallback_result_echoes_input() {
        let mut input = RoutingInput::new("lead-1", "tenant-1");
        input.fallback_team_id = Some("team-pond".to_string());
        input.quiet_hours = true;

        let result = RoutingResult::fallback(&input);
        assert!(result.used_fallback);
        assert!(result.selected_agents.is_empty());
        assert_eq!(result.fallback_team_id.as_deref(), Some("team-pond"));
        assert!(result.quiet_hours);
        assert_eq!(result.lead_id, "lead-1");
    }
}
