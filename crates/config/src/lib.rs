//! Configuration management for the lead router
//!
//! Supports loading:
//! - Application settings from YAML/TOML files and environment variables
//!   (`LEAD_ROUTER_` prefix)
//! - Routing rule sets from YAML or JSON files
//!
//! Rules are validated once when loaded. The engine receives them as plain
//! values and never re-validates.

pub mod conditions;
pub mod rules;
pub mod settings;

pub use conditions::{
    BuyerRepRequirement, ConsentCondition, ConsentRequirement, CustomFieldCondition,
    CustomFieldOperator, DemographicsCondition, GeoSet, GeographyCondition, MatchMode,
    PriceBandCondition, RoutingConditions, SetFilter, SourceCondition, TimeOfDay, TimeWindow,
};
pub use lead_router_core::RoutingConfig;
pub use rules::{
    RoutingRule, RoutingTarget, RuleError, RuleSet, RuleValidator, TeamStrategy,
    ValidationCategory, ValidationError, ValidationResult, ValidationSeverity,
};
pub use settings::{load_settings, ObservabilityConfig, RuntimeEnvironment, Settings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
