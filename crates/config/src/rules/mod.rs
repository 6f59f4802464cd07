//! Routing rules and rule sets
//!
//! A rule is a named set of eligibility conditions plus one or more
//! targets and an optional fallback team. Rule sets are loaded from YAML
//! (or JSON), validated once at load time, and then handed to the engine
//! unchanged for every routing call.
//!
//! # Example Config
//!
//! ```yaml
//! rules:
//!   - id: seniors-east
//!     name: Seniors in the east region
//!     priority: 10
//!     conditions:
//!       demographics:
//!         minAge: 65
//!     targets:
//!       - type: TEAM
//!         teamId: team-east
//!         strategy: ROUND_ROBIN
//!     fallbackTeamId: team-pond
//!   - id: catch-all
//!     priority: 1000
//!     targets:
//!       - type: POND
//!         pondId: shared-pond
//! ```

pub(crate) mod validator;

pub use validator::{
    RuleValidator, ValidationCategory, ValidationError, ValidationResult, ValidationSeverity,
};

use lead_router_core::RoutingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::conditions::RoutingConditions;

/// Rule loading errors
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule file not found: {0}: {1}")]
    FileNotFound(String, String),

    #[error("Failed to parse rules: {0}")]
    ParseError(String),

    #[error("Rule set failed validation with {count} problem(s): {summary}")]
    Invalid { count: usize, summary: String },
}

/// How a team target orders its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamStrategy {
    /// Best score wins, deterministic tie-break
    #[default]
    Score,
    /// Best score wins, ties broken by the team's rotation
    RoundRobin,
}

/// Where a matched rule sends the lead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub enum RoutingTarget {
    /// Explicit list of agents
    Agent {
        #[serde(rename = "agentIds")]
        agent_ids: Vec<String>,
    },
    /// Every agent on a team
    Team {
        #[serde(rename = "teamId")]
        team_id: String,
        #[serde(default)]
        strategy: TeamStrategy,
    },
    /// Shared pool, no agent selected
    Pond {
        #[serde(rename = "pondId")]
        pond_id: String,
    },
}

impl RoutingTarget {
    pub fn is_pond(&self) -> bool {
        matches!(self, Self::Pond { .. })
    }
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    100
}

/// A routing rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingRule {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Lower runs first
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub conditions: Option<RoutingConditions>,
    pub targets: Vec<RoutingTarget>,
    #[serde(default)]
    pub fallback_team_id: Option<String>,
    /// Overrides the default scoring weights for this rule
    #[serde(default)]
    pub config: Option<RoutingConfig>,
}

impl RoutingRule {
    /// Round-robin team targeted by this rule, if any
    pub fn round_robin_team(&self) -> Option<&str> {
        self.targets.iter().find_map(|t| match t {
            RoutingTarget::Team {
                team_id,
                strategy: TeamStrategy::RoundRobin,
            } => Some(team_id.as_str()),
            _ => None,
        })
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RoutingRule>,
}

impl RuleSet {
    /// Load and validate a rule file
    pub fn load<P: AsRef<Path>>(path: P, strict: bool) -> Result<Self, RuleError> {
        let path = path.as_ref();
        Self::read(path)?.validated(&path.display().to_string(), strict)
    }

    /// Parse a rule file without validating it. `.json` files are parsed
    /// as JSON, everything else as YAML.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuleError::FileNotFound(path.display().to_string(), e.to_string())
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, RuleError> {
        serde_yaml::from_str(content).map_err(|e| RuleError::ParseError(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, RuleError> {
        serde_json::from_str(content).map_err(|e| RuleError::ParseError(e.to_string()))
    }

    /// Run the validator. Warnings are logged; in strict mode they fail
    /// the load like errors do.
    pub fn validated(self, source: &str, strict: bool) -> Result<Self, RuleError> {
        let result = RuleValidator::new().validate(source, &self);

        for warning in result.warnings() {
            tracing::warn!(%warning, "Rule set warning");
        }

        let failures: Vec<&ValidationError> = result
            .errors
            .iter()
            .filter(|e| strict || e.severity >= ValidationSeverity::Error)
            .collect();

        if failures.is_empty() {
            tracing::info!(source = %source, rules = self.rules.len(), "Loaded routing rules");
            return Ok(self);
        }

        let summary = failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(RuleError::Invalid {
            count: failures.len(),
            summary,
        })
    }

    pub fn get(&self, id: &str) -> Option<&RoutingRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Enabled rules in evaluation order: ascending priority, then id
    pub fn candidates(&self) -> Vec<&RoutingRule> {
        let mut rules: Vec<&RoutingRule> = self.rules.iter().filter(|r| r.enabled).collect();
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
