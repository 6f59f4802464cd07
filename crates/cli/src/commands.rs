//! Subcommand handlers
//!
//! Requests are JSON documents read from a file (or stdin for `-`).
//! Handlers return serializable values; `main` owns printing.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use lead_router_config::{
    RoutingConditions, RuleSet, RuleValidator, Settings, ValidationResult,
};
use lead_router_core::{RoutingContext, RoutingInput};
use lead_router_engine::{evaluate, evaluate_rule, route_lead, RuleEvaluation, RuleRouter};

/// `evaluate` request body
///
/// With `conditions` the inline conditions are evaluated; with `ruleId`
/// only that rule; otherwise every enabled rule in priority order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvaluateRequest {
    pub context: serde_json::Value,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub conditions: Option<RoutingConditions>,
}

/// `route` request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteRequest {
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    pub input: RoutingInput,
}

pub fn read_request<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path))?
    };
    serde_json::from_str(&content).with_context(|| format!("Invalid request in {}", path))
}

/// Build a context, applying the tenant default timezone when the request
/// names none
pub fn parse_context(mut value: serde_json::Value, default_tz: Tz) -> Result<RoutingContext> {
    if let Some(object) = value.as_object_mut() {
        object
            .entry("timezone")
            .or_insert_with(|| serde_json::Value::String(default_tz.name().to_string()));
    }
    serde_json::from_value(value).context("Invalid routing context")
}

pub fn evaluate_command(
    rules: Option<&RuleSet>,
    request: EvaluateRequest,
    default_tz: Tz,
) -> Result<Vec<RuleEvaluation>> {
    let ctx = parse_context(request.context, default_tz)?;

    if let Some(conditions) = &request.conditions {
        return Ok(vec![RuleEvaluation {
            rule_id: "inline".to_string(),
            evaluation: evaluate(Some(conditions), &ctx),
        }]);
    }

    let Some(rules) = rules else {
        bail!("No rule set loaded and no inline conditions given");
    };

    if let Some(rule_id) = &request.rule_id {
        let rule = rules
            .get(rule_id)
            .with_context(|| format!("Unknown rule '{}'", rule_id))?;
        return Ok(vec![RuleEvaluation {
            rule_id: rule.id.clone(),
            evaluation: evaluate_rule(rule, &ctx),
        }]);
    }

    Ok(rules
        .candidates()
        .into_iter()
        .map(|rule| RuleEvaluation {
            rule_id: rule.id.clone(),
            evaluation: evaluate_rule(rule, &ctx),
        })
        .collect())
}

/// Route through the rule set, or straight to scoring when `rules` is
/// `None`
pub fn route_command(
    rules: Option<&RuleSet>,
    request: RouteRequest,
    settings: &Settings,
) -> Result<serde_json::Value> {
    request.input.validate().context("Invalid routing input")?;

    let Some(rules) = rules else {
        let mut input = request.input;
        input.config = input.config.or(Some(settings.routing));
        return Ok(serde_json::to_value(route_lead(&input))?);
    };

    let context = request
        .context
        .context("Rule-based routing needs a context")?;
    let ctx = parse_context(context, settings.timezone()?)?;
    let decision = RuleRouter::new(settings.routing).route(rules, &ctx, &request.input);
    Ok(serde_json::to_value(decision)?)
}

/// Parse and validate a rule file without failing on findings
pub fn check_command(path: &Path) -> Result<ValidationResult> {
    let rules = RuleSet::read(path)?;
    Ok(RuleValidator::new().validate(&path.display().to_string(), &rules))
}
