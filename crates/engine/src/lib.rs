//! Lead routing engine
//!
//! Pure functions over immutable snapshots:
//! - [`evaluate`]: does a lead satisfy a rule's conditions?
//! - [`score_agent`]: how well does an eligible agent fit the lead?
//! - [`route_lead`]: rank the pool, or fall back when nobody qualifies
//! - [`RuleRouter`]: pick the first matching rule and route with it
//!
//! Nothing here performs I/O or keeps state between calls, apart from the
//! optional round-robin rotation injected into [`RuleRouter`].

pub mod evaluator;
pub mod rotation;
pub mod router;
pub mod rule_router;
pub mod scorer;

pub use evaluator::{evaluate, evaluate_rule};
pub use rotation::InMemoryRotation;
pub use router::{rank_agents, route_lead, route_lead_with_rotation};
pub use rule_router::{resolve_targets, ResolvedTargets, RuleDecision, RuleEvaluation, RuleRouter};
pub use scorer::score_agent;
