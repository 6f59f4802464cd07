//! Collaborator traits
//!
//! The router is pure. State it cannot own (such as the last agent a team
//! assigned to) is injected through these traits.

mod rotation;

pub use rotation::RoundRobinRotation;
