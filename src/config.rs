use crate::domain::Amount;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Three hours, the observed cooldown window.
const DEFAULT_COOLDOWN_MS: i64 = 3 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Secret used to verify initData signatures.
    pub bot_token: String,
    pub cooldown_policy: CooldownPolicy,
    pub cooldown_ms: i64,
    /// Accrual tick period.
    pub tick_ms: u64,
    /// Persist in-flight session state every this many ticks.
    pub flush_every_ticks: u32,
    /// Direct referral bonus; the grand-referrer gets a quarter of it.
    pub referral_bonus: Amount,
}

/// When the post-session cooldown window opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPolicy {
    /// Only when energy reaches 0 (default).
    Exhaustion,
    /// On every session release, regardless of remaining energy.
    Release,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let bot_token = env_map
            .get("BOT_TOKEN")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("BOT_TOKEN".to_string()))?;

        let cooldown_policy = match env_map
            .get("COOLDOWN_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("exhaustion")
        {
            "exhaustion" => CooldownPolicy::Exhaustion,
            "release" => CooldownPolicy::Release,
            other => {
                return Err(ConfigError::InvalidValue(
                    "COOLDOWN_POLICY".to_string(),
                    format!("must be exhaustion or release, got {}", other),
                ))
            }
        };

        let cooldown_ms = parse_i64(&env_map, "COOLDOWN_MS", DEFAULT_COOLDOWN_MS)?;
        if cooldown_ms < 0 {
            return Err(ConfigError::InvalidValue(
                "COOLDOWN_MS".to_string(),
                "must be non-negative".to_string(),
            ));
        }

        let tick_ms = parse_i64(&env_map, "TICK_MS", 1000)?;
        if tick_ms <= 0 {
            return Err(ConfigError::InvalidValue(
                "TICK_MS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let flush_every_ticks = parse_i64(&env_map, "FLUSH_EVERY_TICKS", 5)?;
        if flush_every_ticks <= 0 {
            return Err(ConfigError::InvalidValue(
                "FLUSH_EVERY_TICKS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let referral_bonus = env_map
            .get("REFERRAL_BONUS")
            .map(|s| Amount::from_str(s))
            .unwrap_or_else(|| Ok(Amount::from(100)))
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "REFERRAL_BONUS".to_string(),
                    "must be a valid decimal amount".to_string(),
                )
            })?;
        if referral_bonus.is_negative() {
            return Err(ConfigError::InvalidValue(
                "REFERRAL_BONUS".to_string(),
                "must be non-negative".to_string(),
            ));
        }

        Ok(Config {
            port,
            database_path,
            bot_token,
            cooldown_policy,
            cooldown_ms,
            tick_ms: tick_ms as u64,
            flush_every_ticks: flush_every_ticks as u32,
            referral_bonus,
        })
    }
}

fn parse_i64(
    env_map: &HashMap<String, String>,
    key: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(s) => s.parse::<i64>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), "must be a valid integer".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map.insert("BOT_TOKEN".to_string(), "12345:token".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cooldown_policy, CooldownPolicy::Exhaustion);
        assert_eq!(config.cooldown_ms, 10_800_000);
        assert_eq!(config.tick_ms, 1000);
        assert_eq!(config.flush_every_ticks, 5);
        assert_eq!(config.referral_bonus, Amount::from(100));
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_bot_token() {
        let mut env_map = setup_required_env();
        env_map.remove("BOT_TOKEN");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "BOT_TOKEN"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_cooldown_policy_release() {
        let mut env_map = setup_required_env();
        env_map.insert("COOLDOWN_POLICY".to_string(), "release".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.cooldown_policy, CooldownPolicy::Release);
    }

    #[test]
    fn test_invalid_cooldown_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("COOLDOWN_POLICY".to_string(), "sometimes".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "COOLDOWN_POLICY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_referral_bonus() {
        let mut env_map = setup_required_env();
        env_map.insert("REFERRAL_BONUS".to_string(), "lots".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "REFERRAL_BONUS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_negative_referral_bonus_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("REFERRAL_BONUS".to_string(), "-5".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "REFERRAL_BONUS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_tick_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("TICK_MS".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TICK_MS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
