//! Rule set validator
//!
//! Runs once at rule-load time so that routing never has to guess at a
//! malformed rule. Performs:
//! - Required fields and duplicate id checks
//! - Target shape checks
//! - Value range checks on conditions and weights
//! - Operator/value compatibility for custom fields
//!
//! # Example
//!
//! ```ignore
//! use lead_router_config::rules::RuleValidator;
//!
//! let result = RuleValidator::new().validate("rules.yaml", &rule_set);
//! if !result.is_ok() {
//!     eprintln!("{}", result.summary());
//! }
//! ```

use std::collections::HashSet;

use lead_router_core::RoutingConfig;

use super::{RoutingRule, RoutingTarget, RuleSet};
use crate::conditions::{CustomFieldCondition, RoutingConditions, SetFilter};

/// Validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: ValidationCategory,
    /// Source file or rule id
    pub source: String,
    /// Specific field
    pub field: Option<String>,
    pub message: String,
    pub severity: ValidationSeverity,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field_str = self.field.as_deref().unwrap_or("(root)");
        write!(
            f,
            "[{:?}] {}/{}: {}",
            self.severity, self.source, field_str, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCategory {
    MissingRequired,
    InvalidReference,
    ValueOutOfRange,
    Duplicate,
    SchemaMismatch,
    /// Definition that can never have an effect
    Unused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    /// Rule file being validated
    pub source: String,
}

impl ValidationResult {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            errors: Vec::new(),
            source: source.into(),
        }
    }

    fn push(
        &mut self,
        category: ValidationCategory,
        severity: ValidationSeverity,
        source: &str,
        field: Option<&str>,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationError {
            category,
            source: source.to_string(),
            field: field.map(str::to_string),
            message: message.into(),
            severity,
        });
    }

    pub fn add_critical(&mut self, source: &str, field: Option<&str>, message: impl Into<String>) {
        self.push(
            ValidationCategory::MissingRequired,
            ValidationSeverity::Critical,
            source,
            field,
            message,
        );
    }

    pub fn add_error(
        &mut self,
        category: ValidationCategory,
        source: &str,
        field: &str,
        message: impl Into<String>,
    ) {
        self.push(category, ValidationSeverity::Error, source, Some(field), message);
    }

    pub fn add_warning(&mut self, source: &str, field: &str, message: impl Into<String>) {
        self.push(
            ValidationCategory::Unused,
            ValidationSeverity::Warning,
            source,
            Some(field),
            message,
        );
    }

    /// No errors or critical errors
    pub fn is_ok(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.severity >= ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Warning)
    }

    pub fn errors_and_critical(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity >= ValidationSeverity::Error)
            .collect()
    }

    pub fn summary(&self) -> String {
        let count = |severity| self.errors.iter().filter(|e| e.severity == severity).count();

        if self.errors.is_empty() {
            format!("Rules '{}': All validations passed", self.source)
        } else {
            format!(
                "Rules '{}': {} critical, {} errors, {} warnings",
                self.source,
                count(ValidationSeverity::Critical),
                count(ValidationSeverity::Error),
                count(ValidationSeverity::Warning)
            )
        }
    }
}

/// Tolerance for the weight-sum check
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Rule set validator
#[derive(Debug, Clone, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, source: &str, rule_set: &RuleSet) -> ValidationResult {
        let mut result = ValidationResult::new(source);

        if rule_set.rules.is_empty() {
            result.add_warning(source, "rules", "No rules defined; every lead will fall back");
            return result;
        }

        let mut seen = HashSet::new();
        for rule in &rule_set.rules {
            if rule.id.trim().is_empty() {
                result.add_critical(source, Some("id"), "Rule missing id");
                continue;
            }
            if !seen.insert(rule.id.as_str()) {
                result.push(
                    ValidationCategory::Duplicate,
                    ValidationSeverity::Critical,
                    &rule.id,
                    Some("id"),
                    "Duplicate rule id",
                );
            }
            self.validate_rule(rule, &mut result);
        }

        result
    }

    fn validate_rule(&self, rule: &RoutingRule, result: &mut ValidationResult) {
        self.validate_targets(rule, result);

        if let Some(conditions) = &rule.conditions {
            self.validate_conditions(&rule.id, conditions, result);
        }
        if let Some(config) = &rule.config {
            validate_routing_config(&rule.id, "config", config, result);
        }
        if matches!(&rule.fallback_team_id, Some(team) if team.trim().is_empty()) {
            result.add_error(
                ValidationCategory::MissingRequired,
                &rule.id,
                "fallbackTeamId",
                "Fallback team id is empty",
            );
        }
    }

    fn validate_targets(&self, rule: &RoutingRule, result: &mut ValidationResult) {
        if rule.targets.is_empty() {
            result.add_critical(&rule.id, Some("targets"), "Rule has no targets");
            return;
        }

        for (i, target) in rule.targets.iter().enumerate() {
            let field = format!("targets[{}]", i);
            match target {
                RoutingTarget::Agent { agent_ids } => {
                    if agent_ids.is_empty() {
                        result.add_error(
                            ValidationCategory::MissingRequired,
                            &rule.id,
                            &field,
                            "AGENT target lists no agents",
                        );
                    }
                    if agent_ids.iter().any(|id| id.trim().is_empty()) {
                        result.add_error(
                            ValidationCategory::InvalidReference,
                            &rule.id,
                            &field,
                            "AGENT target contains an empty agent id",
                        );
                    }
                }
                RoutingTarget::Team { team_id, .. } => {
                    if team_id.trim().is_empty() {
                        result.add_error(
                            ValidationCategory::MissingRequired,
                            &rule.id,
                            &field,
                            "TEAM target missing teamId",
                        );
                    }
                }
                RoutingTarget::Pond { pond_id } => {
                    if pond_id.trim().is_empty() {
                        result.add_error(
                            ValidationCategory::MissingRequired,
                            &rule.id,
                            &field,
                            "POND target missing pondId",
                        );
                    }
                    if i > 0 {
                        result.add_warning(
                            &rule.id,
                            &field,
                            "POND target after agent targets is never used",
                        );
                    }
                }
            }
        }

        if rule.targets[0].is_pond() && rule.targets.len() > 1 {
            result.add_warning(
                &rule.id,
                "targets",
                "Rule routes to a pond first; remaining targets are never used",
            );
        }
    }

    fn validate_conditions(
        &self,
        rule_id: &str,
        conditions: &RoutingConditions,
        result: &mut ValidationResult,
    ) {
        if let Some(geography) = &conditions.geography {
            let include_empty = geography.include.as_ref().map_or(true, |s| s.is_empty());
            let exclude_empty = geography.exclude.as_ref().map_or(true, |s| s.is_empty());
            if include_empty && exclude_empty {
                result.add_warning(rule_id, "geography", "Geography condition has no values");
            }
        }

        if let Some(band) = &conditions.price_band {
            if let (Some(min), Some(max)) = (band.min, band.max) {
                if min > max {
                    result.add_error(
                        ValidationCategory::ValueOutOfRange,
                        rule_id,
                        "priceBand",
                        format!("Invalid range: min ({}) > max ({})", min, max),
                    );
                }
            }
            if band.min.map_or(false, |v| v < 0.0) || band.max.map_or(false, |v| v < 0.0) {
                result.add_error(
                    ValidationCategory::ValueOutOfRange,
                    rule_id,
                    "priceBand",
                    "Price bounds must not be negative",
                );
            }
            if !band.has_bound() {
                result.add_warning(rule_id, "priceBand", "Price band has no bounds");
            }
        }

        if let Some(sources) = &conditions.sources {
            let overlap = sources
                .include
                .iter()
                .find(|s| sources.exclude.iter().any(|e| e.eq_ignore_ascii_case(s)));
            if let Some(source) = overlap {
                result.add_error(
                    ValidationCategory::SchemaMismatch,
                    rule_id,
                    "sources",
                    format!("Source '{}' is both included and excluded", source),
                );
            }
        }

        if let Some(windows) = &conditions.time_windows {
            if windows.is_empty() {
                result.add_error(
                    ValidationCategory::MissingRequired,
                    rule_id,
                    "timeWindows",
                    "Empty window list never matches",
                );
            }
            for (i, window) in windows.iter().enumerate() {
                let field = format!("timeWindows[{}]", i);
                if window.start == window.end {
                    result.add_error(
                        ValidationCategory::ValueOutOfRange,
                        rule_id,
                        &field,
                        format!("Window {}-{} is empty", window.start, window.end),
                    );
                }
                if matches!(&window.days, Some(days) if days.is_empty()) {
                    result.add_error(
                        ValidationCategory::MissingRequired,
                        rule_id,
                        &field,
                        "Window lists no days",
                    );
                }
            }
        }

        if let Some(demographics) = &conditions.demographics {
            if let (Some(min), Some(max)) = (demographics.min_age, demographics.max_age) {
                if min > max {
                    result.add_error(
                        ValidationCategory::ValueOutOfRange,
                        rule_id,
                        "demographics",
                        format!("Invalid age range: min ({}) > max ({})", min, max),
                    );
                }
            }
            let filters = [
                ("demographics.tags", &demographics.tags),
                ("demographics.languages", &demographics.languages),
                ("demographics.ethnicities", &demographics.ethnicities),
            ];
            for (field, filter) in filters {
                if filter.as_ref().map_or(false, SetFilter::is_empty) {
                    result.add_warning(rule_id, field, "Filter has no values");
                }
            }
        }

        if let Some(fields) = &conditions.custom_fields {
            for (i, condition) in fields.iter().enumerate() {
                validate_custom_field(rule_id, i, condition, result);
            }
        }
    }
}

fn validate_custom_field(
    rule_id: &str,
    index: usize,
    condition: &CustomFieldCondition,
    result: &mut ValidationResult,
) {
    let field = format!("customFields[{}]", index);
    let op = condition.operator;

    if condition.key.trim().is_empty() {
        result.add_error(
            ValidationCategory::MissingRequired,
            rule_id,
            &field,
            "Custom field condition missing key",
        );
    }

    if op.is_presence() {
        if !condition.value.is_null() {
            result.add_warning(rule_id, &field, format!("{} ignores its value", op));
        }
        return;
    }

    if op.takes_list() && !condition.value.is_array() {
        result.add_error(
            ValidationCategory::SchemaMismatch,
            rule_id,
            &field,
            format!("{} requires a list value", op),
        );
    }

    if op.is_numeric() {
        let numeric = match &condition.value {
            serde_json::Value::Number(_) => true,
            serde_json::Value::String(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        };
        if !numeric {
            result.add_error(
                ValidationCategory::SchemaMismatch,
                rule_id,
                &field,
                format!("{} requires a numeric value", op),
            );
        }
    }

    if condition.value.is_null() {
        result.add_error(
            ValidationCategory::MissingRequired,
            rule_id,
            &field,
            format!("{} requires a value", op),
        );
    }
}

/// Weights must each lie in [0, 1]; a sum other than 1.0 is only a warning
/// since scores are never renormalized.
pub(crate) fn validate_routing_config(
    source: &str,
    field: &str,
    config: &RoutingConfig,
    result: &mut ValidationResult,
) {
    let weights = [
        ("performanceWeight", config.performance_weight),
        ("capacityWeight", config.capacity_weight),
        ("geographyWeight", config.geography_weight),
        ("priceBandWeight", config.price_band_weight),
    ];
    for (name, value) in weights {
        if !(0.0..=1.0).contains(&value) {
            result.add_error(
                ValidationCategory::ValueOutOfRange,
                source,
                &format!("{}.{}", field, name),
                format!("Must be between 0.0 and 1.0, got {}", value),
            );
        }
    }

    if !config.minimum_score.is_finite() || config.minimum_score < 0.0 {
        result.add_error(
            ValidationCategory::ValueOutOfRange,
            source,
            &format!("{}.minimumScore", field),
            format!("Must be a non-negative number, got {}", config.minimum_score),
        );
    }

    let sum = config.weight_sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        result.add_warning(
            source,
            field,
            format!("Factor weights sum to {:.3}, expected 1.0", sum),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_yaml(yaml: &str) -> ValidationResult {
        let rules = RuleSet::from_yaml_str(yaml).unwrap();
        RuleValidator::new().validate("test", &rules)
    }

    #[test]
    fn test_valid_rules_pass() {
        let result = validate_yaml(
            r#"
rules:
  - id: r1
    conditions:
      priceBand: { min: 100000, max: 500000 }
      customFields:
        - { key: age, operator: GTE, value: 65 }
        - { key: demographic, operator: IN, value: [hispanic, latino] }
        - { key: referral, operator: EXISTS }
    targets:
      - { type: AGENT, agentIds: [a] }
"#,
        );
        assert!(result.is_ok(), "{}", result.summary());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_duplicate_ids() {
        let result = validate_yaml(
            r#"
rules:
  - { id: r1, targets: [{ type: POND, pondId: p }] }
  - { id: r1, targets: [{ type: POND, pondId: p }] }
"#,
        );
        assert!(!result.is_ok());
        assert_eq!(result.errors[0].category, ValidationCategory::Duplicate);
    }

    #[test]
    fn test_inverted_ranges() {
        let result = validate_yaml(
            r#"
rules:
  - id: r1
    conditions:
      priceBand: { min: 900000, max: 100000 }
      demographics: { minAge: 70, maxAge: 60 }
    targets: [{ type: POND, pondId: p }]
"#,
        );
        let errors = result.errors_and_critical();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.category == ValidationCategory::ValueOutOfRange));
    }

    #[test]
    fn test_custom_field_value_shapes() {
        let result = validate_yaml(
            r#"
rules:
  - id: r1
    conditions:
      customFields:
        - { key: tier, operator: IN, value: gold }
        - { key: age, operator: GT, value: old }
        - { key: "", operator: EQUALS, value: x }
    targets: [{ type: POND, pondId: p }]
"#,
        );
        let errors = result.errors_and_critical();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field.as_deref(), Some("customFields[0]"));
        assert_eq!(errors[1].field.as_deref(), Some("customFields[1]"));
        assert_eq!(errors[2].field.as_deref(), Some("customFields[2]"));
    }

    #[test]
    fn test_empty_time_window() {
        let result = validate_yaml(
            r#"
rules:
  - id: r1
    conditions:
      timeWindows:
        - { start: "09:00", end: "09:00" }
        - { start: "22:00", end: "06:00", days: [] }
    targets: [{ type: POND, pondId: p }]
"#,
        );
        assert_eq!(result.errors_and_critical().len(), 2);
    }

    #[test]
    fn test_weight_sum_is_warning_only() {
        let mut result = ValidationResult::new("settings");
        let config = RoutingConfig {
            performance_weight: 0.5,
            ..RoutingConfig::default()
        };
        validate_routing_config("settings", "routing", &config, &mut result);
        assert!(result.is_ok());
        assert_eq!(result.warnings().count(), 1);

        let config = RoutingConfig {
            capacity_weight: 1.5,
            ..RoutingConfig::default()
        };
        let mut result = ValidationResult::new("settings");
        validate_routing_config("settings", "routing", &config, &mut result);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_pond_first_with_extra_targets_warns() {
        let result = validate_yaml(
            r#"
rules:
  - id: r1
    targets:
      - { type: POND, pondId: p }
      - { type: TEAM, teamId: t }
"#,
        );
        assert!(result.is_ok());
        assert_eq!(result.warnings().count(), 1);
    }
}
