//! Agent scoring
//!
//! An agent's score is a weighted sum of four factors:
//!
//! | Factor      | Weight                                 | Value              |
//! |-------------|----------------------------------------|--------------------|
//! | performance | `performanceWeight`                    | `keptApptRate`     |
//! | capacity    | `capacityWeight`                       | capacity headroom  |
//! | geography   | `geographyWeight * geographyImportance` | `geographyFit`     |
//! | price band  | `priceBandWeight * priceBandImportance` | `priceBandFit`     |
//!
//! Agents failing a compliance gate (`consentReady`, `tenDlcReady`) are
//! not scored at all. Scores are not clamped or renormalized.

use lead_router_core::{AgentScore, AgentSnapshot, Importances, ReasonKind, RoutingConfig, ScoreReason};

/// Score one agent, or `None` if the agent is not eligible
pub fn score_agent(
    agent: &AgentSnapshot,
    config: &RoutingConfig,
    importances: Importances,
) -> Option<AgentScore> {
    if !agent.is_eligible() {
        tracing::debug!(
            agent = %agent.user_id,
            consent_ready = agent.consent_ready,
            ten_dlc_ready = agent.ten_dlc_ready,
            "Agent failed compliance gate"
        );
        return None;
    }

    let reasons = vec![
        ScoreReason::new(
            ReasonKind::Performance,
            config.performance_weight,
            agent.kept_appt_rate,
        ),
        ScoreReason::new(
            ReasonKind::Capacity,
            config.capacity_weight,
            agent.capacity_headroom(),
        ),
        ScoreReason::new(
            ReasonKind::Geography,
            config.geography_weight * importances.geography,
            agent.geography_fit,
        ),
        ScoreReason::new(
            ReasonKind::PriceBand,
            config.price_band_weight * importances.price_band,
            agent.price_band_fit,
        ),
    ];
    let score: f64 = reasons.iter().map(|r| r.contribution).sum();

    tracing::trace!(agent = %agent.user_id, score, "Scored agent");

    Some(AgentScore {
        user_id: agent.user_id.clone(),
        team_id: agent.team_id.clone(),
        score,
        active_pipeline: agent.active_pipeline,
        reasons,
    })
}
