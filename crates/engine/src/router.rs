//! Lead router
//!
//! Scores every agent in the pool, drops the ineligible and those under
//! the minimum score, and ranks the rest:
//!
//! 1. score, descending
//! 2. `activePipeline`, ascending
//! 3. `userId`, ascending
//!
//! When nothing survives, the result is a fallback carrying the input's
//! `fallbackTeamId` (which may be absent). Equal inputs always produce
//! equal output.

use std::cmp::Ordering;
use std::collections::HashMap;

use lead_router_core::{AgentScore, RoundRobinRotation, RoutingInput, RoutingResult};

use crate::scorer::score_agent;

fn rank_order(a: &AgentScore, b: &AgentScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.active_pipeline.cmp(&b.active_pipeline))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Eligible agents at or above the minimum score, best first
pub fn rank_agents(input: &RoutingInput) -> Vec<AgentScore> {
    let config = input.effective_config();
    let importances = input.importances();

    let mut ranked: Vec<AgentScore> = input
        .agents
        .iter()
        .filter_map(|agent| score_agent(agent, &config, importances))
        // NaN never passes the floor
        .filter(|score| score.score >= config.minimum_score)
        .collect();
    ranked.sort_by(rank_order);
    ranked
}

fn finish(input: &RoutingInput, ranked: Vec<AgentScore>) -> RoutingResult {
    if ranked.is_empty() {
        tracing::info!(
            lead_id = %input.lead_id,
            tenant_id = %input.tenant_id,
            candidates = input.agents.len(),
            fallback_team = input.fallback_team_id.as_deref().unwrap_or("none"),
            quiet_hours = input.quiet_hours,
            "No agent qualified, using fallback"
        );
        return RoutingResult::fallback(input);
    }

    tracing::info!(
        lead_id = %input.lead_id,
        tenant_id = %input.tenant_id,
        top_agent = %ranked[0].user_id,
        top_score = ranked[0].score,
        selected = ranked.len(),
        quiet_hours = input.quiet_hours,
        "Routed lead"
    );

    RoutingResult {
        lead_id: input.lead_id.clone(),
        tenant_id: input.tenant_id.clone(),
        selected_agents: ranked,
        used_fallback: false,
        fallback_team_id: input.fallback_team_id.clone(),
        quiet_hours: input.quiet_hours,
    }
}

/// Route a lead to the best-scoring eligible agents
pub fn route_lead(input: &RoutingInput) -> RoutingResult {
    finish(input, rank_agents(input))
}

/// Route a lead, letting `rotation` pick among agents tied at the top
///
/// Only agents equal to the leader on both score and `activePipeline` are
/// tied. The chosen agent moves to the front of the tied group; the
/// relative order of the group is otherwise kept and nobody outside it
/// moves.
pub fn route_lead_with_rotation(
    input: &RoutingInput,
    team_id: &str,
    rotation: &dyn RoundRobinRotation,
) -> RoutingResult {
    let mut ranked = rank_agents(input);
    apply_rotation(input, &mut ranked, team_id, rotation);
    finish(input, ranked)
}

fn apply_rotation(
    input: &RoutingInput,
    ranked: &mut [AgentScore],
    team_id: &str,
    rotation: &dyn RoundRobinRotation,
) {
    let Some(leader) = ranked.first() else {
        return;
    };
    let tied_len = ranked
        .iter()
        .take_while(|s| {
            s.score.total_cmp(&leader.score) == Ordering::Equal
                && s.active_pipeline == leader.active_pipeline
        })
        .count();
    if tied_len < 2 {
        return;
    }

    // Rotation order: roundRobinOrder when set (unset last), then user id
    let orders: HashMap<&str, Option<u32>> = input
        .agents
        .iter()
        .map(|a| (a.user_id.as_str(), a.round_robin_order))
        .collect();
    let mut tied: Vec<&str> = ranked[..tied_len].iter().map(|s| s.user_id.as_str()).collect();
    tied.sort_by(|a, b| {
        let (oa, ob) = (orders.get(a).copied().flatten(), orders.get(b).copied().flatten());
        match (oa, ob) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.cmp(b))
    });

    let Some(next) = rotation.next_agent(team_id, &tied) else {
        return;
    };
    match ranked[..tied_len].iter().position(|s| s.user_id == next) {
        Some(pos) => {
            tracing::debug!(team_id, agent = %next, tied = tied_len, "Rotation broke top-score tie");
            ranked[..=pos].rotate_right(1);
        }
        None => {
            tracing::warn!(team_id, agent = %next, "Rotation picked an agent outside the tie");
        }
    }
}
