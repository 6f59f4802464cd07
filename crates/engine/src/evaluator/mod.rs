//! Routing condition evaluator
//!
//! Decides whether a lead satisfies a rule's eligibility conditions. Each
//! category present in the conditions yields one [`ConditionCheck`]; the
//! overall result is the AND of all of them. Absent categories are not
//! evaluated and never fail.
//!
//! Evaluation is pure: the same conditions and context always produce the
//! same result, and the order categories appear in the source file has no
//! effect. Checks are always reported in a fixed category order.
//!
//! # Example
//!
//! ```ignore
//! use lead_router_engine::evaluate;
//!
//! let result = evaluate(rule.conditions.as_ref(), &ctx);
//! if !result.matched {
//!     for check in result.failed_checks() {
//!         println!("{}: {:?}", check.key, check.detail);
//!     }
//! }
//! ```

mod custom_fields;
mod location;
mod matching;
mod person;
mod schedule;

use lead_router_config::{RoutingConditions, RoutingRule};
use lead_router_core::{ConditionCheck, EvaluationResult, RoutingContext};

/// Evaluate conditions against a routing context
///
/// `None` (or empty conditions) matches with no checks.
pub fn evaluate(conditions: Option<&RoutingConditions>, ctx: &RoutingContext) -> EvaluationResult {
    let Some(conditions) = conditions else {
        return EvaluationResult::from_checks(Vec::new());
    };

    let listing = ctx.listing.as_ref();
    let person = &ctx.person;
    let mut checks: Vec<ConditionCheck> = Vec::with_capacity(8);

    if let Some(geography) = &conditions.geography {
        checks.push(location::check_geography(geography, listing));
    }
    if let Some(price_band) = &conditions.price_band {
        checks.push(location::check_price_band(price_band, listing));
    }
    if let Some(sources) = &conditions.sources {
        checks.push(person::check_sources(sources, person));
    }
    if let Some(consent) = &conditions.consent {
        checks.push(person::check_consent(consent, person));
    }
    if let Some(buyer_rep) = conditions.buyer_rep {
        checks.push(person::check_buyer_rep(buyer_rep, person));
    }
    if let Some(windows) = &conditions.time_windows {
        checks.push(schedule::check_time_windows(windows, ctx.now, ctx.timezone));
    }
    if let Some(demographics) = &conditions.demographics {
        checks.push(person::check_demographics(demographics, person));
    }
    if let Some(custom) = &conditions.custom_fields {
        checks.push(custom_fields::check_custom_fields(custom, &person.custom_fields));
    }

    let result = EvaluationResult::from_checks(checks);
    for failed in result.failed_checks() {
        tracing::debug!(
            condition = %failed.key,
            detail = failed.detail.as_deref().unwrap_or_default(),
            "Condition failed"
        );
    }
    result
}

/// Evaluate a rule's conditions
pub fn evaluate_rule(rule: &RoutingRule, ctx: &RoutingContext) -> EvaluationResult {
    let result = evaluate(rule.conditions.as_ref(), ctx);
    tracing::debug!(
        rule_id = %rule.id,
        matched = result.matched,
        checks = result.checks.len(),
        "Evaluated rule conditions"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lead_router_core::{ConditionKey, ListingContext, PersonContext};
    use serde_json::json;

    fn conditions(yaml: &str) -> RoutingConditions {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn context(person: serde_json::Value) -> RoutingContext {
        // Wednesday 2024-05-01 15:00 UTC
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap();
        RoutingContext::new(now)
            .with_person(serde_json::from_value::<PersonContext>(person).unwrap())
            .with_listing(ListingContext {
                price: Some(425_000.0),
                currency: Some("USD".to_string()),
                city: Some("Austin".to_string()),
                state: Some("TX".to_string()),
                postal_code: Some("78701".to_string()),
            })
    }

    #[test]
    fn test_no_conditions_match() {
        let ctx = context(json!({}));
        let result = evaluate(None, &ctx);
        assert!(result.matched);
        assert!(result.checks.is_empty());

        let empty = RoutingConditions::default();
        assert!(evaluate(Some(&empty), &ctx).matched);
    }

    #[test]
    fn test_missing_age_fails_closed() {
        let c = conditions(
            r#"
demographics:
  minAge: 55
  ethnicities:
    include: [hispanic]
"#,
        );
        let ctx = context(json!({ "tags": ["hispanic"] }));
        let result = evaluate(Some(&c), &ctx);
        assert!(!result.matched);
        let check = result.check(ConditionKey::Demographics).unwrap();
        assert_eq!(check.detail.as_deref(), Some("age unknown"));
    }

    #[test]
    fn test_hispanic_tag_satisfies_ethnicity() {
        let c = conditions(
            r#"
demographics:
  minAge: 55
  ethnicities:
    include: [hispanic]
"#,
        );
        let ctx = context(json!({ "age": 61, "tags": ["Hispanic"] }));
        assert!(evaluate(Some(&c), &ctx).matched);
    }

    #[test]
    fn test_custom_fields_gte_and_in() {
        let c = conditions(
            r#"
customFields:
  - key: age
    operator: GTE
    value: 65
  - key: demographic
    operator: IN
    value: [hispanic, latino]
"#,
        );
        let ctx = context(json!({
            "customFields": { "age": 70, "demographic": "hispanic" }
        }));
        assert!(evaluate(Some(&c), &ctx).matched);

        let ctx = context(json!({
            "customFields": { "age": 64, "demographic": "hispanic" }
        }));
        assert!(!evaluate(Some(&c), &ctx).matched);
    }

    #[test]
    fn test_checks_in_fixed_order() {
        let c = conditions(
            r#"
customFields:
  - key: tier
    operator: EXISTS
sources:
  include: [zillow]
geography:
  include:
    states: [TX]
priceBand:
  min: 300000
  max: 500000
"#,
        );
        let ctx = context(json!({ "source": "zillow", "customFields": { "tier": "gold" } }));
        let result = evaluate(Some(&c), &ctx);
        let keys: Vec<ConditionKey> = result.checks.iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                ConditionKey::Geography,
                ConditionKey::PriceBand,
                ConditionKey::Sources,
                ConditionKey::CustomFields,
            ]
        );
        assert!(result.matched);
    }

    #[test]
    fn test_category_order_in_source_is_irrelevant() {
        let a = conditions(
            r#"
sources:
  include: [zillow]
consent:
  sms: GRANTED
buyerRep: PROHIBIT_ACTIVE
"#,
        );
        let b = conditions(
            r#"
buyerRep: PROHIBIT_ACTIVE
consent:
  sms: GRANTED
sources:
  include: [zillow]
"#,
        );
        for person in [
            json!({ "source": "zillow", "consent": { "sms": "GRANTED" } }),
            json!({ "source": "zillow", "consent": { "sms": "REVOKED" } }),
            json!({ "source": "facebook", "buyerRepStatus": "ACTIVE" }),
        ] {
            let ctx = context(person);
            assert_eq!(evaluate(Some(&a), &ctx), evaluate(Some(&b), &ctx));
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let c = conditions(
            r#"
geography:
  exclude:
    cities: [Dallas]
timeWindows:
  - timezone: America/Chicago
    start: "08:00"
    end: "20:00"
demographics:
  languages:
    include: [spanish]
"#,
        );
        let ctx = context(json!({ "languages": ["Spanish"] }));
        let first = evaluate(Some(&c), &ctx);
        for _ in 0..10 {
            assert_eq!(evaluate(Some(&c), &ctx), first);
        }
        assert!(first.matched);
    }

    #[test]
    fn test_one_failure_fails_everything() {
        let c = conditions(
            r#"
geography:
  include:
    states: [TX]
sources:
  exclude: [facebook]
"#,
        );
        let ctx = context(json!({ "source": "Facebook" }));
        let result = evaluate(Some(&c), &ctx);
        assert!(!result.matched);
        assert!(result.check(ConditionKey::Geography).unwrap().passed);
        assert_eq!(result.failed_checks().count(), 1);
    }
}
