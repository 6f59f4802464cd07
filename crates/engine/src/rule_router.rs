//! Rule-driven routing
//!
//! Walks a [`RuleSet`] in priority order, evaluates each rule's conditions
//! against the lead and routes with the first rule that matches:
//!
//! - a `POND` first target sends the lead to a shared pool without scoring
//! - otherwise the rule's agent and team targets are resolved against the
//!   agent pool and the lead is routed with [`route_lead`]
//!
//! A rule's own `config` and `fallbackTeamId` take precedence over the
//! request's; the router's default config is used when neither sets one.
//!
//! # Example
//!
//! ```ignore
//! use lead_router_engine::{InMemoryRotation, RuleRouter};
//! use std::sync::Arc;
//!
//! let router = RuleRouter::new(settings.routing)
//!     .with_rotation(Arc::new(InMemoryRotation::new()));
//! let decision = router.route(&rules, &ctx, &input);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use lead_router_config::{RoutingRule, RoutingTarget, RuleSet};
use lead_router_core::{
    AgentSnapshot, EvaluationResult, RoundRobinRotation, RoutingConfig, RoutingContext,
    RoutingInput, RoutingResult,
};
use serde::{Deserialize, Serialize};

use crate::evaluator::evaluate_rule;
use crate::router::{route_lead, route_lead_with_rotation};

/// Condition outcome for one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    pub rule_id: String,
    pub evaluation: EvaluationResult,
}

/// Outcome of routing a lead through a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDecision {
    /// A rule matched and its candidate agents were ranked
    #[serde(rename_all = "camelCase")]
    Routed {
        rule_id: String,
        evaluation: EvaluationResult,
        result: RoutingResult,
    },
    /// A rule matched and sends the lead to a shared pool
    #[serde(rename_all = "camelCase")]
    Pond {
        rule_id: String,
        pond_id: String,
        evaluation: EvaluationResult,
    },
    /// No enabled rule matched
    #[serde(rename_all = "camelCase")]
    NoRuleMatched {
        evaluations: Vec<RuleEvaluation>,
        result: RoutingResult,
    },
}

impl RuleDecision {
    /// Matched rule, if any
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Self::Routed { rule_id, .. } | Self::Pond { rule_id, .. } => Some(rule_id),
            Self::NoRuleMatched { .. } => None,
        }
    }

    /// Agent routing result, absent for pond assignments
    pub fn result(&self) -> Option<&RoutingResult> {
        match self {
            Self::Routed { result, .. } | Self::NoRuleMatched { result, .. } => Some(result),
            Self::Pond { .. } => None,
        }
    }
}

/// Candidate pool after resolving a rule's targets
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTargets {
    Pond(String),
    Agents(Vec<AgentSnapshot>),
}

/// Resolve targets against the agent pool
///
/// The first target decides the kind: a leading `POND` wins outright.
/// Otherwise every `AGENT` and `TEAM` target contributes its agents; the
/// union keeps pool order and holds each agent once.
pub fn resolve_targets(targets: &[RoutingTarget], pool: &[AgentSnapshot]) -> ResolvedTargets {
    if let Some(RoutingTarget::Pond { pond_id }) = targets.first() {
        return ResolvedTargets::Pond(pond_id.clone());
    }

    let mut seen = HashSet::new();
    let agents = pool
        .iter()
        .filter(|agent| targets.iter().any(|target| target_includes(target, agent)))
        .filter(|agent| seen.insert(agent.user_id.as_str()))
        .cloned()
        .collect();
    ResolvedTargets::Agents(agents)
}

fn target_includes(target: &RoutingTarget, agent: &AgentSnapshot) -> bool {
    match target {
        RoutingTarget::Agent { agent_ids } => agent_ids.iter().any(|id| *id == agent.user_id),
        RoutingTarget::Team { team_id, .. } => agent.team_id.as_deref() == Some(team_id.as_str()),
        RoutingTarget::Pond { .. } => false,
    }
}

/// Routes leads through a rule set
pub struct RuleRouter {
    default_config: RoutingConfig,
    rotation: Option<Arc<dyn RoundRobinRotation>>,
}

impl RuleRouter {
    pub fn new(default_config: RoutingConfig) -> Self {
        Self {
            default_config,
            rotation: None,
        }
    }

    /// Consult `rotation` to break top-score ties on round-robin teams
    pub fn with_rotation(mut self, rotation: Arc<dyn RoundRobinRotation>) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Route `input` with the first matching rule of `rules`
    pub fn route(&self, rules: &RuleSet, ctx: &RoutingContext, input: &RoutingInput) -> RuleDecision {
        let mut evaluations = Vec::new();

        for rule in rules.candidates() {
            let evaluation = evaluate_rule(rule, ctx);
            if evaluation.matched {
                return self.route_with_rule(rule, evaluation, input);
            }
            evaluations.push(RuleEvaluation {
                rule_id: rule.id.clone(),
                evaluation,
            });
        }

        tracing::info!(
            lead_id = %input.lead_id,
            rules_evaluated = evaluations.len(),
            "No routing rule matched"
        );
        RuleDecision::NoRuleMatched {
            evaluations,
            result: RoutingResult::fallback(input),
        }
    }

    fn route_with_rule(
        &self,
        rule: &RoutingRule,
        evaluation: EvaluationResult,
        input: &RoutingInput,
    ) -> RuleDecision {
        let agents = match resolve_targets(&rule.targets, &input.agents) {
            ResolvedTargets::Pond(pond_id) => {
                tracing::info!(
                    lead_id = %input.lead_id,
                    rule_id = %rule.id,
                    pond_id = %pond_id,
                    "Lead sent to pond"
                );
                return RuleDecision::Pond {
                    rule_id: rule.id.clone(),
                    pond_id,
                    evaluation,
                };
            }
            ResolvedTargets::Agents(agents) => agents,
        };

        tracing::debug!(
            rule_id = %rule.id,
            rule = rule.display_name(),
            candidates = agents.len(),
            "Routing with matched rule"
        );

        let scoped = RoutingInput {
            agents,
            config: Some(
                rule.config
                    .or(input.config)
                    .unwrap_or(self.default_config),
            ),
            fallback_team_id: rule
                .fallback_team_id
                .clone()
                .or_else(|| input.fallback_team_id.clone()),
            ..input.clone()
        };

        let result = match (rule.round_robin_team(), &self.rotation) {
            (Some(team_id), Some(rotation)) => {
                route_lead_with_rotation(&scoped, team_id, rotation.as_ref())
            }
            _ => route_lead(&scoped),
        };

        RuleDecision::Routed {
            rule_id: rule.id.clone(),
            evaluation,
            result,
        }
    }
}

impl std::fmt::Debug for RuleRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRouter")
            .field("default_config", &self.default_config)
            .field("rotation", &self.rotation.is_some())
            .finish()
    }
}
