//! Routing rule eligibility conditions
//!
//! Every category is optional; an absent category always passes. Enum
//! strings (operators, consent requirements, weekdays, timezones) are
//! checked when the rule is deserialized, so an unknown value fails the
//! rule load instead of being guessed at during routing.
//!
//! # Example Config
//!
//! ```yaml
//! conditions:
//!   geography:
//!     include:
//!       states: [TX]
//!     exclude:
//!       postalCodes: ["75001"]
//!   priceBand:
//!     min: 250000
//!     max: 900000
//!   consent:
//!     sms: GRANTED
//!   timeWindows:
//!     - timezone: America/Chicago
//!       start: "08:00"
//!       end: "20:00"
//!       days: [Mon, Tue, Wed, Thu, Fri]
//!   customFields:
//!     - key: age
//!       operator: GTE
//!       value: 65
//! ```

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use lead_router_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Eligibility filter of a routing rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutingConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography: Option<GeographyCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_band: Option<PriceBandCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_rep: Option<BuyerRepRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_windows: Option<Vec<TimeWindow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<DemographicsCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomFieldCondition>>,
}

impl RoutingConditions {
    /// True when no category is present
    pub fn is_empty(&self) -> bool {
        self.geography.is_none()
            && self.price_band.is_none()
            && self.sources.is_none()
            && self.consent.is_none()
            && self.buyer_rep.is_none()
            && self.time_windows.is_none()
            && self.demographics.is_none()
            && self.custom_fields.is_none()
    }
}

/// Location values matched against the listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeoSet {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub postal_codes: Vec<String>,
}

impl GeoSet {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.cities.is_empty() && self.postal_codes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeographyCondition {
    #[serde(default)]
    pub include: Option<GeoSet>,
    #[serde(default)]
    pub exclude: Option<GeoSet>,
}

/// Listing price bound; either side optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceBandCondition {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl PriceBandCondition {
    pub fn has_bound(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceCondition {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Per-channel consent requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentRequirement {
    #[default]
    Optional,
    /// State must be GRANTED
    Granted,
    /// State may be GRANTED or UNKNOWN
    NotRevoked,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsentCondition {
    #[serde(default)]
    pub sms: Option<ConsentRequirement>,
    #[serde(default)]
    pub email: Option<ConsentRequirement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuyerRepRequirement {
    #[default]
    Any,
    RequiredActive,
    ProhibitActive,
}

/// Time of day written as "HH:MM" or "HH:MM:SS"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self)
            .map_err(|_| Error::InvalidTimeOfDay(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Recurring availability window
///
/// The window covers `[start, end)` local time. When `end` is earlier
/// than `start` the window runs past midnight and the early-morning part
/// belongs to the day it started on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeWindow {
    /// Falls back to the tenant timezone when absent
    #[serde(default)]
    pub timezone: Option<Tz>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// All days when absent
    #[serde(default)]
    pub days: Option<Vec<Weekday>>,
}

impl TimeWindow {
    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMode {
    /// At least one included value present
    #[default]
    Any,
    /// Every included value present
    All,
}

/// Case-insensitive include/exclude filter over a set of strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetFilter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
}

impl SetFilter {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DemographicsCondition {
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub tags: Option<SetFilter>,
    #[serde(default)]
    pub languages: Option<SetFilter>,
    #[serde(default)]
    pub ethnicities: Option<SetFilter>,
}

/// Comparison operator for custom fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CustomFieldOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    Exists,
    NotExists,
}

impl CustomFieldOperator {
    pub const ALL: [CustomFieldOperator; 12] = [
        Self::Equals,
        Self::NotEquals,
        Self::In,
        Self::NotIn,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Contains,
        Self::NotContains,
        Self::Exists,
        Self::NotExists,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT_EXISTS",
        }
    }

    /// GT/GTE/LT/LTE
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// IN/NOT_IN take a list value
    pub fn takes_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// EXISTS/NOT_EXISTS ignore the value
    pub fn is_presence(&self) -> bool {
        matches!(self, Self::Exists | Self::NotExists)
    }
}

impl FromStr for CustomFieldOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

impl TryFrom<String> for CustomFieldOperator {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CustomFieldOperator> for String {
    fn from(value: CustomFieldOperator) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CustomFieldOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{key, operator, value}` comparison against the person's custom fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomFieldCondition {
    pub key: String,
    pub operator: CustomFieldOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}
