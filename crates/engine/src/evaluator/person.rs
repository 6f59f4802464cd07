//! Person-based checks: source, consent, buyer representation, demographics

use lead_router_config::{
    BuyerRepRequirement, ConsentCondition, ConsentRequirement, DemographicsCondition,
    SourceCondition,
};
use lead_router_core::{ConditionCheck, ConditionKey, ConsentState, PersonContext};

use super::matching::{in_set, set_filter_matches};

pub(crate) fn check_sources(condition: &SourceCondition, person: &PersonContext) -> ConditionCheck {
    let key = ConditionKey::Sources;
    let source = person.source.as_deref();

    if !condition.include.is_empty() && !in_set(&condition.include, source) {
        let detail = match source {
            Some(s) => format!("source '{}' not included", s),
            None => "lead has no source".to_string(),
        };
        return ConditionCheck::fail(key, detail);
    }

    if in_set(&condition.exclude, source) {
        return ConditionCheck::fail(
            key,
            format!("source '{}' is excluded", source.unwrap_or_default()),
        );
    }

    ConditionCheck::pass(key)
}

fn consent_satisfied(requirement: ConsentRequirement, state: ConsentState) -> bool {
    match requirement {
        ConsentRequirement::Optional => true,
        ConsentRequirement::Granted => state == ConsentState::Granted,
        ConsentRequirement::NotRevoked => state != ConsentState::Revoked,
    }
}

pub(crate) fn check_consent(condition: &ConsentCondition, person: &PersonContext) -> ConditionCheck {
    let key = ConditionKey::Consent;
    let channels = [
        ("sms", condition.sms, person.consent.sms),
        ("email", condition.email, person.consent.email),
    ];

    let failures: Vec<String> = channels
        .iter()
        .filter_map(|(channel, requirement, state)| {
            let requirement = (*requirement)?;
            (!consent_satisfied(requirement, *state))
                .then(|| format!("{} consent is {}", channel, state.as_str()))
        })
        .collect();

    if failures.is_empty() {
        ConditionCheck::pass(key)
    } else {
        ConditionCheck::fail(key, failures.join("; "))
    }
}

pub(crate) fn check_buyer_rep(
    requirement: BuyerRepRequirement,
    person: &PersonContext,
) -> ConditionCheck {
    let key = ConditionKey::BuyerRep;
    let active = person.buyer_rep_status.is_active();

    match requirement {
        BuyerRepRequirement::Any => ConditionCheck::pass(key),
        BuyerRepRequirement::RequiredActive if !active => {
            ConditionCheck::fail(key, "active buyer representation required")
        }
        BuyerRepRequirement::ProhibitActive if active => {
            ConditionCheck::fail(key, "lead already has active buyer representation")
        }
        _ => ConditionCheck::pass(key),
    }
}

pub(crate) fn check_demographics(
    condition: &DemographicsCondition,
    person: &PersonContext,
) -> ConditionCheck {
    let key = ConditionKey::Demographics;

    // Any age bound needs a known age
    if condition.min_age.is_some() || condition.max_age.is_some() {
        let Some(age) = person.age else {
            return ConditionCheck::fail(key, "age unknown");
        };
        if let Some(min) = condition.min_age {
            if age < min {
                return ConditionCheck::fail(key, format!("age {} below {}", age, min));
            }
        }
        if let Some(max) = condition.max_age {
            if age > max {
                return ConditionCheck::fail(key, format!("age {} above {}", age, max));
            }
        }
    }

    fn as_refs(values: &[String]) -> Vec<&str> {
        values.iter().map(String::as_str).collect()
    }

    if let Some(filter) = &condition.tags {
        if let Err(reason) = set_filter_matches(filter, &as_refs(&person.tags)) {
            return ConditionCheck::fail(key, format!("tags: {}", reason));
        }
    }

    if let Some(filter) = &condition.languages {
        if let Err(reason) = set_filter_matches(filter, &as_refs(&person.languages)) {
            return ConditionCheck::fail(key, format!("languages: {}", reason));
        }
    }

    if let Some(filter) = &condition.ethnicities {
        // Ethnicity is often captured as a tag rather than a dedicated field
        let values: Vec<&str> = person
            .ethnicities
            .iter()
            .chain(person.tags.iter())
            .map(String::as_str)
            .collect();
        if let Err(reason) = set_filter_matches(filter, &values) {
            return ConditionCheck::fail(key, format!("ethnicities: {}", reason));
        }
    }

    ConditionCheck::pass(key)
}
