use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Tunables of the reservation protocol. The 300-second hold is the lease
/// the whole locking design is built around; the sweep interval only bounds
/// how stale an expired hold can look on the seat map.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_hold_seconds")]
    pub seat_hold_seconds: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    #[serde(default = "default_premium_multiplier")]
    pub premium_multiplier: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_hold_seconds() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    15
}

fn default_premium_multiplier() -> f64 {
    1.5
}

fn default_currency() -> String {
    "USD".to_owned()
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            seat_hold_seconds: default_hold_seconds(),
            sweep_interval_seconds: default_sweep_interval(),
            premium_multiplier: default_premium_multiplier(),
            currency: default_currency(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // environment overlay, e.g. config/production.toml; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // local overrides, not checked in; optional
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. MARQUEE__SERVER__PORT=8080
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
