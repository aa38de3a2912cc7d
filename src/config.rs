use anyhow::Result;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub api_url: String,
    pub database_url: String,
    /// Whole hours east of UTC used for local days and month boundaries.
    pub utc_offset_hours: i32,
    pub request_timeout: Duration,
    pub device_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        Self::from_vars(discord_token, |key| env::var(key).ok())
    }

    fn from_vars(discord_token: String, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = var("API_URL").unwrap_or_else(|| "http://localhost:8080/api".to_string());

        let database_url = var("DATABASE_URL").unwrap_or_else(|| "sqlite:ponto.db".to_string());

        let utc_offset_hours = match var("UTC_OFFSET_HOURS") {
            Some(value) => value
                .trim()
                .parse::<i32>()
                .map_err(|_| anyhow::anyhow!("UTC_OFFSET_HOURS must be an integer, got {:?}", value))?,
            None => -3,
        };
        if !(-23..=23).contains(&utc_offset_hours) {
            return Err(anyhow::anyhow!(
                "UTC_OFFSET_HOURS must be between -23 and 23, got {}",
                utc_offset_hours
            ));
        }

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a positive integer, got {:?}", value)
            })?,
            None => 10,
        };

        let device_name = var("DEVICE_NAME").unwrap_or_else(|| "Discord Bot".to_string());

        Ok(Config {
            discord_token,
            api_url,
            database_url,
            utc_offset_hours,
            request_timeout: Duration::from_secs(request_timeout),
            device_name,
        })
    }
}
