//! Application settings

use chrono_tz::Tz;
use config::{Config, Environment, File};
use lead_router_core::RoutingConfig;
use serde::{Deserialize, Serialize};

use crate::rules::{validator::validate_routing_config, RuleError, RuleSet, ValidationResult};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Rule-set warnings fail the load in strict environments
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Default weights for rules that carry no config of their own
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Path to the routing rule file (YAML or JSON)
    #[serde(default = "default_rules_path")]
    pub rules_path: String,

    /// IANA name of the tenant default timezone
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_rules_path() -> String {
    "config/rules.yaml".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            routing: RoutingConfig::default(),
            rules_path: default_rules_path(),
            default_timezone: default_timezone(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed default timezone
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.default_timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "default_timezone".to_string(),
                message: format!("Unknown timezone '{}'", self.default_timezone),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;

        let mut result = ValidationResult::new("settings");
        validate_routing_config("settings", "routing", &self.routing, &mut result);

        for warning in result.warnings() {
            tracing::warn!(%warning, "Settings warning");
        }
        if let Some(error) = result.errors_and_critical().first() {
            return Err(ConfigError::InvalidValue {
                field: error.field.clone().unwrap_or_default(),
                message: error.message.clone(),
            });
        }

        Ok(())
    }

    /// Load the rule file named by `rules_path`
    pub fn load_rules(&self) -> Result<RuleSet, RuleError> {
        RuleSet::load(&self.rules_path, self.environment.is_strict())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults.
/// Environment variables use the `LEAD_ROUTER` prefix and `__` as the
/// section separator, e.g. `LEAD_ROUTER__ROUTING__MINIMUM_SCORE=0.4`.
///
/// Keys must be snake_case. The `config` crate lowercases keys, so a
/// camelCase `routing.minimumScore` arrives as `minimumscore` and is
/// rejected as an unknown field.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("LEAD_ROUTER")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
