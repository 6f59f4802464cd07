//! In-process round-robin rotation
//!
//! Remembers the last agent picked per team and hands out the next one in
//! the tied list, wrapping around. State lives only as long as the value;
//! a deployment with several routers should back [`RoundRobinRotation`]
//! with shared storage instead.

use std::collections::HashMap;

use lead_router_core::RoundRobinRotation;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryRotation {
    last_assigned: Mutex<HashMap<String, String>>,
}

impl InMemoryRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last agent handed out for `team_id`
    pub fn last_assigned(&self, team_id: &str) -> Option<String> {
        self.last_assigned.lock().get(team_id).cloned()
    }

    pub fn reset(&self) {
        self.last_assigned.lock().clear();
    }
}

impl RoundRobinRotation for InMemoryRotation {
    fn next_agent(&self, team_id: &str, tied: &[&str]) -> Option<String> {
        if tied.is_empty() {
            return None;
        }

        let mut last_assigned = self.last_assigned.lock();
        let next_index = last_assigned
            .get(team_id)
            .and_then(|last| tied.iter().position(|id| id == last))
            .map_or(0, |pos| (pos + 1) % tied.len());

        let next = tied[next_index].to_string();
        last_assigned.insert(team_id.to_string(), next.clone());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_cycles_through_tied_agents() {
        let rotation = InMemoryRotation::new();
        let tied = ["agent-a", "agent-b", "agent-c"];

        let picks: Vec<String> = (0..4)
            .filter_map(|_| rotation.next_agent("team-east", &tied))
            .collect();
        assert_eq!(picks, vec!["agent-a", "agent-b", "agent-c", "agent-a"]);
        assert_eq!(rotation.last_assigned("team-east").as_deref(), Some("agent-a"));
    }

    #[test]
    fn test_teams_rotate_independently() {
        let rotation = InMemoryRotation::new();
        let tied = ["agent-a", "agent-b"];
        assert_eq!(rotation.next_agent("team-east", &tied).as_deref(), Some("agent-a"));
        assert_eq!(rotation.next_agent("team-west", &tied).as_deref(), Some("agent-a"));
        assert_eq!(rotation.next_agent("team-east", &tied).as_deref(), Some("agent-b"));
    }

    #[test]
    fn test_restarts_when_last_agent_left_the_tie() {
        let rotation = InMemoryRotation::new();
        rotation.next_agent("team-east", &["agent-x"]);
        assert_eq!(
            rotation.next_agent("team-east", &["agent-a", "agent-b"]).as_deref(),
            Some("agent-a")
        );
    }

    #[test]
    fn test_empty_tie() {
        let rotation = InMemoryRotation::new();
        assert!(rotation.next_agent("team-east", &[]).is_none());

        rotation.next_agent("team-east", &["agent-a"]);
        rotation.reset();
        assert!(rotation.last_assigned("team-east").is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let rotation = Arc::new(InMemoryRotation::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rotation = Arc::clone(&rotation);
                std::thread::spawn(move || {
                    rotation.next_agent("team-east", &["agent-a", "agent-b"])
                })
            })
            .collect();
        let picks: Vec<String> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        let a = picks.iter().filter(|p| *p == "agent-a").count();
        assert_eq!(a, 2);
        assert_eq!(picks.len(), 4);
    }
}
