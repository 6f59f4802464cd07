//! Round-robin rotation collaborator
//!
//! Teams using a round-robin strategy need the "last assigned" position,
//! which lives outside the engine. The router only consults the rotation
//! to break a tie at the top score; it never overrides a strictly better
//! score.
//!
//! # Example
//!
//! ```ignore
//! use lead_router_core::traits::RoundRobinRotation;
//!
//! let next = rotation.next_agent("team-east", &["agent-a", "agent-b"]);
//! ```

/// Source of "next agent in rotation" for a team
pub trait RoundRobinRotation: Send + Sync {
    /// Pick the next agent among `tied`, in the team's rotation order
    ///
    /// `tied` is in rotation order: agents with a `roundRobinOrder` first,
    /// ascending, then the rest by user id. Returning `None`, or an id not
    /// in `tied`, leaves the deterministic order untouched.
    fn next_agent(&self, team_id: &str, tied: &[&str]) -> Option<String>;
}
