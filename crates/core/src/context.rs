//! Evaluation-time facts about a lead
//!
//! A [`RoutingContext`] is built by the caller for every evaluation. It
//! carries the clock, the tenant's default timezone, the person behind the
//! lead and (optionally) the listing the lead enquired about.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open key/value bag attached to a person.
///
/// Ordered so that serialized output and iteration are stable.
pub type CustomFields = BTreeMap<String, serde_json::Value>;

/// Consent state for a single contact channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentState {
    Granted,
    Revoked,
    #[default]
    Unknown,
}

impl ConsentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "GRANTED",
            Self::Revoked => "REVOKED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Consent state per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelConsent {
    #[serde(default)]
    pub sms: ConsentState,
    #[serde(default)]
    pub email: ConsentState,
}

/// Buyer-representation agreement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuyerRepStatus {
    /// No agreement on file
    #[default]
    None,
    /// Agreement sent, not yet signed
    Pending,
    /// Signed and in force
    Active,
    /// Lapsed or terminated
    Expired,
}

impl BuyerRepStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Person attributes relevant to rule eligibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonContext {
    /// Acquisition source (e.g. "zillow", "open_house")
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub buyer_rep_status: BuyerRepStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub ethnicities: Vec<String>,
    #[serde(default)]
    pub custom_fields: CustomFields,
    #[serde(default)]
    pub consent: ChannelConsent,
}

/// Listing attributes, present when the lead is tied to a property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingContext {
    #[serde(default)]
    pub price: Option<f64>,
    /// ISO currency code of `price`
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Point-in-time facts used by the condition evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingContext {
    /// Evaluation instant
    pub now: DateTime<Utc>,
    /// Tenant default timezone, used by time windows that name none
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default)]
    pub person: PersonContext,
    #[serde(default)]
    pub listing: Option<ListingContext>,
}

fn default_timezone() -> Tz {
    Tz::UTC
}

impl RoutingContext {
    /// Context at `now` in UTC with an empty person and no listing
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            timezone: default_timezone(),
            person: PersonContext::default(),
            listing: None,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_person(mut self, person: PersonContext) -> Self {
        self.person = person;
        self
    }

    pub fn with_listing(mut self, listing: ListingContext) -> Self {
        self.listing = Some(listing);
        self
    }
}
