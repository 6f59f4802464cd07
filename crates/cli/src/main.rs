//! Lead router command-line entry point
//!
//! Loads settings (files + `LEAD_ROUTER__*` env vars), loads the routing
//! rule file and answers one request. Decisions are printed to stdout as
//! JSON; logs go to stderr.

mod commands;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use lead_router_config::{load_settings, RuleSet, Settings, ValidationSeverity};

use crate::commands::{EvaluateRequest, RouteRequest};

#[derive(Parser, Debug)]
#[command(name = "lead-router")]
#[command(version, about = "Route leads to the best-fitting agent", long_about = None)]
struct Cli {
    /// Rule file, overriding `rules_path` from settings
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the rule file and list every finding
    Check,
    /// Evaluate rule conditions for a lead
    Evaluate {
        /// Request JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        request: String,
    },
    /// Route a lead
    Route {
        /// Request JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        request: String,

        /// Skip rules and score the whole agent pool
        #[arg(long)]
        direct: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("LEAD_ROUTER_ENV").ok();
    let mut settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };
    if let Some(rules) = &cli.rules {
        settings.rules_path = rules.display().to_string();
    }

    init_tracing(&settings);
    tracing::debug!(
        environment = ?settings.environment,
        rules_path = %settings.rules_path,
        "Configuration loaded"
    );

    if let Err(e) = run(cli, &settings) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli, settings: &Settings) -> Result<()> {
    match cli.command {
        Commands::Check => {
            let result = commands::check_command(Path::new(&settings.rules_path))?;
            let findings: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            print_json(&findings, cli.pretty)?;
            if !result.is_ok() {
                anyhow::bail!("{}", result.summary());
            }
            let warnings = result
                .errors
                .iter()
                .filter(|e| e.severity == ValidationSeverity::Warning)
                .count();
            tracing::info!(warnings, "Rule file is valid");
            Ok(())
        }
        Commands::Evaluate { request } => {
            let request: EvaluateRequest = commands::read_request(&request)?;
            let rules = if request.conditions.is_some() {
                None
            } else {
                Some(settings.load_rules()?)
            };
            let evaluations =
                commands::evaluate_command(rules.as_ref(), request, settings.timezone()?)?;
            print_json(&evaluations, cli.pretty)
        }
        Commands::Route { request, direct } => {
            let request: RouteRequest = commands::read_request(&request)?;
            let rules: Option<RuleSet> = if direct {
                None
            } else {
                Some(settings.load_rules()?)
            };
            let output = commands::route_command(rules.as_ref(), request, settings)?;
            print_json(&output, cli.pretty)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// Initialize tracing on stderr; stdout carries the JSON output
fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("lead_router={}", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}
