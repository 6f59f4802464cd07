//! Listing-based checks: geography and price band
//!
//! Both fail closed on missing listing data when a positive match is
//! required. An exclude set with nothing to compare against passes.

use lead_router_config::{GeoSet, GeographyCondition, PriceBandCondition};
use lead_router_core::{ConditionCheck, ConditionKey, ListingContext};

use super::matching::{eq_ci, in_set};

/// First listing field that falls in `set`
fn matching_field(set: &GeoSet, listing: Option<&ListingContext>) -> Option<&'static str> {
    let listing = listing?;
    if in_set(&set.states, listing.state.as_deref()) {
        return Some("state");
    }
    if in_set(&set.cities, listing.city.as_deref()) {
        return Some("city");
    }
    if in_set(&set.postal_codes, listing.postal_code.as_deref()) {
        return Some("postalCode");
    }
    None
}

pub(crate) fn check_geography(
    condition: &GeographyCondition,
    listing: Option<&ListingContext>,
) -> ConditionCheck {
    let key = ConditionKey::Geography;

    if let Some(include) = condition.include.as_ref().filter(|s| !s.is_empty()) {
        if matching_field(include, listing).is_none() {
            let detail = if listing.is_none() {
                "no listing to match included geography"
            } else {
                "listing outside included geography"
            };
            return ConditionCheck::fail(key, detail);
        }
    }

    if let Some(exclude) = &condition.exclude {
        if let Some(field) = matching_field(exclude, listing) {
            return ConditionCheck::fail(key, format!("listing {} is excluded", field));
        }
    }

    ConditionCheck::pass(key)
}

pub(crate) fn check_price_band(
    condition: &PriceBandCondition,
    listing: Option<&ListingContext>,
) -> ConditionCheck {
    let key = ConditionKey::PriceBand;

    if !condition.has_bound() {
        return ConditionCheck::pass(key);
    }

    let Some(listing) = listing else {
        return ConditionCheck::fail(key, "no listing");
    };
    let Some(price) = listing.price else {
        return ConditionCheck::fail(key, "listing price unknown");
    };

    if let (Some(wanted), Some(actual)) = (&condition.currency, &listing.currency) {
        if !eq_ci(wanted, actual) {
            return ConditionCheck::fail(
                key,
                format!("currency {} does not match {}", actual, wanted),
            );
        }
    }

    if let Some(min) = condition.min {
        if price < min {
            return ConditionCheck::fail(key, format!("price {} below {}", price, min));
        }
    }
    if let Some(max) = condition.max {
        if price > max {
            return ConditionCheck::fail(key, format!("price {} above {}", price, max));
        }
    }

    ConditionCheck::pass(key)
}
