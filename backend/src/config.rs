use anyhow::Context;

use crate::engine::{EngineConfig, DEFAULT_SLOT_MINUTES, DEFAULT_STRESS_COOLDOWN_MINUTES};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub cors_origins: Vec<String>,
    pub max_range_days: i64,
    pub engine: EngineConfig,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{name} must be a number")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let slot_minutes: u32 = parse_var("SLOT_MINUTES", DEFAULT_SLOT_MINUTES)?;
        if slot_minutes == 0 || 1440 % slot_minutes != 0 {
            anyhow::bail!("SLOT_MINUTES must evenly divide a day (1440 minutes)");
        }

        let max_range_days: i64 = parse_var("MAX_RANGE_DAYS", 31)?;
        if max_range_days < 1 {
            anyhow::bail!("MAX_RANGE_DAYS must be at least 1");
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_range_days,
            engine: EngineConfig {
                stress_cooldown_minutes: parse_var(
                    "STRESS_COOLDOWN_MINUTES",
                    DEFAULT_STRESS_COOLDOWN_MINUTES,
                )?,
                slot_minutes,
            },
        })
    }
}
