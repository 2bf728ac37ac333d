//! Configuration management for the Stacks server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Lending policy knobs; defaults match the long-standing circulation rules.
#[derive(Debug, Deserialize, Clone)]
pub struct LendingConfig {
    /// Loan period in days, also the extension added by a renewal
    pub loan_period_days: i64,
    /// Maximum open loans per holder
    pub max_loans: usize,
    /// Maximum renewals per loan
    pub max_renewals: i32,
    /// Reservation hold lifetime in days
    pub hold_expiry_days: i64,
    /// Maximum concurrent active holds per holder
    pub max_holds: usize,
    /// Overdue fine per day of lateness
    pub fine_per_day: f64,
    /// Replacement charge used when a lost report carries no cost
    pub default_replacement_cost: f64,
}

/// Endpoints of the identity and fine ledger collaborators
#[derive(Debug, Deserialize, Clone)]
pub struct CollaboratorsConfig {
    pub identity_url: String,
    pub fines_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SweepConfig {
    /// Interval between background sweep passes, in seconds
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub lending: LendingConfig,
    pub collaborators: CollaboratorsConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix STACKS_)
            .add_source(
                Environment::with_prefix("STACKS")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override collaborator endpoints from env vars if present
            .set_override_option(
                "collaborators.identity_url",
                env::var("IDENTITY_SERVICE_URL").ok(),
            )?
            .set_override_option(
                "collaborators.fines_url",
                env::var("PAYMENT_SERVICE_URL").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            max_loans: 5,
            max_renewals: 2,
            hold_expiry_days: 7,
            max_holds: 5,
            fine_per_day: 1.0,
            default_replacement_cost: 50.0,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { interval_secs: 3600 }
    }
}
