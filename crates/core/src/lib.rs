//! Core value types and traits for the lead router
//!
//! This crate provides the types shared by every other crate:
//! - Routing context snapshots (person, listing, clock, tenant timezone)
//! - Agent snapshots and scores
//! - Routing input/result and per-condition evaluation output
//! - Error types
//! - Collaborator traits (round-robin rotation)
//!
//! Everything here is a plain immutable value. Nothing holds state between
//! routing calls.

pub mod agent;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod routing;
pub mod traits;

pub use agent::{AgentScore, AgentSnapshot, ReasonKind, ScoreReason};
pub use context::{
    BuyerRepStatus, ChannelConsent, ConsentState, CustomFields, ListingContext, PersonContext,
    RoutingContext,
};
pub use error::{Error, Result};
pub use evaluation::{ConditionCheck, ConditionKey, EvaluationResult};
pub use routing::{Importances, RoutingConfig, RoutingInput, RoutingResult};
pub use traits::RoundRobinRotation;
