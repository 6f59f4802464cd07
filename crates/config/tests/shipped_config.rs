//! Checks the rule and settings files shipped under `config/`

use std::path::PathBuf;

use lead_router_config::{RoutingTarget, RuleSet, TeamStrategy};

fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
}

/// Test that the shipped rule file passes strict validation
#[test]
fn test_shipped_rules_are_strictly_valid() {
    let rules = RuleSet::load(config_dir().join("rules.yaml"), true).unwrap();
    let ids: Vec<&str> = rules.candidates().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["spanish-seniors", "luxury-tx", "portal-buyers", "catch-all"]
    );

    let seniors = rules.get("spanish-seniors").unwrap();
    assert!(matches!(
        &seniors.targets[0],
        RoutingTarget::Team { strategy: TeamStrategy::RoundRobin, .. }
    ));
    assert!(rules.get("catch-all").unwrap().targets[0].is_pond());
}

/// Test that the shipped settings files deserialize
#[test]
fn test_shipped_settings_parse() {
    for name in ["default.yaml", "production.yaml"] {
        let content = std::fs::read_to_string(config_dir().join(name)).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert!(value.get("environment").is_some(), "{} has no environment", name);
    }
}
