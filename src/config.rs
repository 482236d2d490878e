use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "5001"),
            mongodb_uri: try_load("MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_db: try_load("MONGODB_DB", "blog"),
            admin_password: load_secret("ADMIN_PASSWORD"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

// Unlike the rest of the config, a missing secret must not abort the
// process. Admin routes reject everything until it is set.
fn load_secret(key: &str) -> Option<String> {
    let value = env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if value.is_none() {
        warn!("{key} not set, admin routes will reject every request");
    }

    value
}
