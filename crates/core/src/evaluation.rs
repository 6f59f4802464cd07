//! Condition evaluation output

use serde::{Deserialize, Serialize};

/// Condition category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionKey {
    Geography,
    PriceBand,
    Sources,
    Consent,
    BuyerRep,
    TimeWindows,
    Demographics,
    CustomFields,
}

impl ConditionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geography => "geography",
            Self::PriceBand => "priceBand",
            Self::Sources => "sources",
            Self::Consent => "consent",
            Self::BuyerRep => "buyerRep",
            Self::TimeWindows => "timeWindows",
            Self::Demographics => "demographics",
            Self::CustomFields => "customFields",
        }
    }
}

impl std::fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one condition category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionCheck {
    pub key: ConditionKey,
    pub passed: bool,
    /// Why the check failed (or a short note on a pass)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ConditionCheck {
    pub fn pass(key: ConditionKey) -> Self {
        Self {
            key,
            passed: true,
            detail: None,
        }
    }

    pub fn fail(key: ConditionKey, detail: impl Into<String>) -> Self {
        Self {
            key,
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Result of evaluating a rule's conditions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// AND of every check; true when there are none
    pub matched: bool,
    /// One entry per category present in the conditions
    pub checks: Vec<ConditionCheck>,
}

impl EvaluationResult {
    pub fn from_checks(checks: Vec<ConditionCheck>) -> Self {
        let matched = checks.iter().all(|c| c.passed);
        Self { matched, checks }
    }

    /// Check for a category, if it was evaluated
    pub fn check(&self, key: ConditionKey) -> Option<&ConditionCheck> {
        self.checks.iter().find(|c| c.key == key)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &ConditionCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}
