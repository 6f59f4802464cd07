//! Custom field comparisons
//!
//! Values come from an open key/value bag, so comparisons are loose:
//! strings compare case-insensitively, numeric strings compare as numbers,
//! and anything that cannot be compared fails the check. A missing key
//! fails every operator except `NOT_EXISTS`. A key holding `null` counts
//! as present for `EXISTS`/`NOT_EXISTS` and fails every value operator.

use lead_router_config::{CustomFieldCondition, CustomFieldOperator};
use lead_router_core::{ConditionCheck, ConditionKey, CustomFields};
use serde_json::Value;
use std::cmp::Ordering;

use super::matching::eq_ci;

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => eq_ci(a, b),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (as_number(actual), as_number(expected)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => actual == expected,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `None` when the values cannot be compared this way
fn contains(actual: &Value, expected: &Value) -> Option<bool> {
    match actual {
        Value::String(haystack) => {
            let needle = scalar_text(expected)?;
            Some(
                haystack
                    .to_lowercase()
                    .contains(needle.trim().to_lowercase().as_str()),
            )
        }
        Value::Array(items) => Some(items.iter().any(|item| loose_eq(item, expected))),
        _ => None,
    }
}

fn numeric_cmp(actual: &Value, expected: &Value) -> Option<Ordering> {
    as_number(actual)?.partial_cmp(&as_number(expected)?)
}

/// Apply one operator. `actual` is `None` when the key is absent.
pub(crate) fn compare(op: CustomFieldOperator, actual: Option<&Value>, expected: &Value) -> bool {
    match op {
        CustomFieldOperator::Exists => actual.is_some(),
        CustomFieldOperator::NotExists => actual.is_none(),
        _ => actual
            .filter(|v| !v.is_null())
            .map_or(false, |actual| compare_present(op, actual, expected)),
    }
}

fn compare_present(op: CustomFieldOperator, actual: &Value, expected: &Value) -> bool {
    use CustomFieldOperator::*;

    match op {
        Exists => true,
        NotExists => false,
        Equals => loose_eq(actual, expected),
        NotEquals => !loose_eq(actual, expected),
        In => expected
            .as_array()
            .map_or(false, |items| items.iter().any(|e| loose_eq(actual, e))),
        NotIn => expected
            .as_array()
            .map_or(false, |items| !items.iter().any(|e| loose_eq(actual, e))),
        Gt => numeric_cmp(actual, expected) == Some(Ordering::Greater),
        Gte => matches!(
            numeric_cmp(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Lt => numeric_cmp(actual, expected) == Some(Ordering::Less),
        Lte => matches!(
            numeric_cmp(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Contains => contains(actual, expected) == Some(true),
        NotContains => contains(actual, expected) == Some(false),
    }
}

pub(crate) fn check_custom_fields(
    conditions: &[CustomFieldCondition],
    fields: &CustomFields,
) -> ConditionCheck {
    let key = ConditionKey::CustomFields;

    for condition in conditions {
        let actual = fields.get(&condition.key);
        if !compare(condition.operator, actual, &condition.value) {
            let detail = if condition.operator.is_presence() {
                format!("{} {}", condition.key, condition.operator)
            } else {
                format!(
                    "{} {} {} not satisfied",
                    condition.key, condition.operator, condition.value
                )
            };
            return ConditionCheck::fail(key, detail);
        }
    }

    ConditionCheck::pass(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(key: &str, op: CustomFieldOperator, value: Value) -> CustomFieldCondition {
        CustomFieldCondition {
            key: key.to_string(),
            operator: op,
            value,
        }
    }

    fn fields(value: Value) -> CustomFields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_equality_is_loose() {
        use CustomFieldOperator::*;
        assert!(compare(Equals, Some(&json!("Gold")), &json!("gold")));
        assert!(compare(Equals, Some(&json!("70")), &json!(70)));
        assert!(compare(Equals, Some(&json!(70.0)), &json!(70)));
        assert!(compare(Equals, Some(&json!(true)), &json!(true)));
        assert!(!compare(Equals, Some(&json!("seventy")), &json!(70)));
        assert!(compare(NotEquals, Some(&json!("silver")), &json!("gold")));
    }

    #[test]
    fn test_missing_key_fails_closed() {
        use CustomFieldOperator::*;
        for op in [Equals, NotEquals, In, NotIn, Gt, Gte, Lt, Lte, Contains, NotContains, Exists] {
            assert!(!compare(op, None, &json!("x")), "{} should fail on missing key", op);
        }
        assert!(compare(NotExists, None, &Value::Null));
    }

    #[test]
    fn test_presence_ignores_value() {
        use CustomFieldOperator::*;
        assert!(compare(Exists, Some(&json!("")), &json!("anything")));
        assert!(!compare(NotExists, Some(&json!(0)), &Value::Null));
    }

    #[test]
    fn test_numeric_operators() {
        use CustomFieldOperator::*;
        assert!(compare(Gte, Some(&json!(65)), &json!(65)));
        assert!(compare(Gt, Some(&json!("70")), &json!(65)));
        assert!(compare(Lt, Some(&json!(1.5)), &json!("2")));
        assert!(compare(Lte, Some(&json!(2)), &json!(2.0)));
        assert!(!compare(Gt, Some(&json!(60)), &json!(65)));
    }

    #[test]
    fn test_non_numeric_comparison_fails() {
        use CustomFieldOperator::*;
        assert!(!compare(Gt, Some(&json!("old")), &json!(65)));
        assert!(!compare(Lt, Some(&json!(10)), &json!("young")));
        assert!(!compare(Gte, Some(&json!(true)), &json!(1)));
    }

    #[test]
    fn test_in_operators() {
        use CustomFieldOperator::*;
        let list = json!(["hispanic", "latino"]);
        assert!(compare(In, Some(&json!("Hispanic")), &list));
        assert!(!compare(In, Some(&json!("asian")), &list));
        assert!(compare(NotIn, Some(&json!("asian")), &list));
        assert!(!compare(NotIn, Some(&json!("latino")), &list));
        // Malformed list value
        assert!(!compare(In, Some(&json!("hispanic")), &json!("hispanic")));
        assert!(!compare(NotIn, Some(&json!("asian")), &json!("hispanic")));
    }

    #[test]
    fn test_contains_operators() {
        use CustomFieldOperator::*;
        assert!(compare(Contains, Some(&json!("Prefers Evening Calls")), &json!("evening")));
        assert!(compare(Contains, Some(&json!(["va", "fha"])), &json!("FHA")));
        assert!(compare(Contains, Some(&json!([1, 2, 3])), &json!(2)));
        assert!(compare(NotContains, Some(&json!("cash buyer")), &json!("loan")));
        assert!(!compare(NotContains, Some(&json!(["va"])), &json!("va")));
        // Not a string or list
        assert!(!compare(Contains, Some(&json!(42)), &json!("4")));
        assert!(!compare(NotContains, Some(&json!(42)), &json!("4")));
    }

    #[test]
    fn test_null_value_is_present_but_not_comparable() {
        use CustomFieldOperator::*;
        let person_fields = fields(json!({ "income": null }));

        let exists = vec![cond("income", Exists, Value::Null)];
        assert!(check_custom_fields(&exists, &person_fields).passed);

        let not_exists = vec![cond("income", NotExists, Value::Null)];
        let check = check_custom_fields(&not_exists, &person_fields);
        assert!(!check.passed);
        assert_eq!(check.detail.as_deref(), Some("income NOT_EXISTS"));

        for op in [Equals, NotEquals, In, NotIn, Gt, Gte, Lt, Lte, Contains, NotContains] {
            let conditions = vec![cond("income", op, json!(0))];
            assert!(
                !check_custom_fields(&conditions, &person_fields).passed,
                "{} should fail on null",
                op
            );
        }
    }

    #[test]
    fn test_check_requires_all_conditions() {
        let person_fields = fields(json!({ "age": 70, "demographic": "hispanic" }));
        let conditions = vec![
            cond("age", CustomFieldOperator::Gte, json!(65)),
            cond("demographic", CustomFieldOperator::In, json!(["hispanic", "latino"])),
        ];
        assert!(check_custom_fields(&conditions, &person_fields).passed);

        let stricter = vec![
            cond("age", CustomFieldOperator::Gte, json!(65)),
            cond("income", CustomFieldOperator::Gt, json!(100000)),
        ];
        let check = check_custom_fields(&stricter, &person_fields);
        assert!(!check.passed);
        assert_eq!(check.detail.as_deref(), Some("income GT 100000 not satisfied"));
    }
}
