use anyhow::anyhow;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub db_max_connections: u32,
    /// Seconds a transaction waits for a row lock before giving up.
    pub lock_wait_timeout_secs: u64,
    pub holiday_cache_ttl_secs: u64,
    pub notification_queue_capacity: usize,
    /// Period of the background expiry sweep; 0 turns it off.
    pub expiry_sweep_interval_secs: u64,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<String> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("{} must be set", name))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value {:?} for {}: {}", raw, name, e)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self {
            server_addr: required(&lookup, "SERVER_ADDR")?,
            database_url: required(&lookup, "DATABASE_URL")?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            lock_wait_timeout_secs: parse_or(&lookup, "LOCK_WAIT_TIMEOUT_SECS", 5)?,
            holiday_cache_ttl_secs: parse_or(&lookup, "HOLIDAY_CACHE_TTL_SECS", 3600)?,
            notification_queue_capacity: parse_or(&lookup, "NOTIFICATION_QUEUE_CAPACITY", 1024)?,
            expiry_sweep_interval_secs: parse_or(&lookup, "EXPIRY_SWEEP_INTERVAL_SECS", 3600)?,
        };

        if config.rate_protected_per_min == 0 {
            return Err(anyhow!("RATE_PROTECTED_PER_MIN must be positive"));
        }
        if config.notification_queue_capacity == 0 {
            return Err(anyhow!("NOTIFICATION_QUEUE_CAPACITY must be positive"));
        }
        if config.lock_wait_timeout_secs == 0 {
            return Err(anyhow!("LOCK_WAIT_TIMEOUT_SECS must be positive"));
        }
        Ok(config)
    }

    pub fn holiday_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.holiday_cache_ttl_secs)
    }

    pub fn expiry_sweep_interval(&self) -> Option<Duration> {
        (self.expiry_sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.expiry_sweep_interval_secs))
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: "mysql://localhost/test".into(),
            jwt_secret: jwt_secret.into(),
            server_addr: "127.0.0.1:0".into(),
            api_prefix: "/api".into(),
            rate_protected_per_min: 1000,
            db_max_connections: 1,
            lock_wait_timeout_secs: 5,
            holiday_cache_ttl_secs: 60,
            notification_queue_capacity: 16,
            expiry_sweep_interval_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("SERVER_ADDR", "0.0.0.0:8080"),
        ("DATABASE_URL", "mysql://root@localhost/hrms"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.lock_wait_timeout_secs, 5);
        assert_eq!(config.notification_queue_capacity, 1024);
        assert_eq!(config.expiry_sweep_interval(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn missing_required_variable_is_an_error() {
        let err = Config::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn bad_number_is_an_error_not_a_panic() {
        let mut vars = BASE.to_vec();
        vars.push(("DB_MAX_CONNECTIONS", "ten"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn zero_interval_disables_sweep() {
        let mut vars = BASE.to_vec();
        vars.push(("EXPIRY_SWEEP_INTERVAL_SECS", "0"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.expiry_sweep_interval(), None);
    }
}
