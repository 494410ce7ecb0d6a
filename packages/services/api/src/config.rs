//! Service configuration

use std::env;

/// Guildhall API configuration
///
/// Loaded from `GUILDHALL_*` environment variables once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port
    pub port: u16,

    /// SQLite database URL
    pub database_url: String,

    /// Token key material (hex / base64 / raw 32 bytes)
    pub token_key: Option<String>,

    /// Lifetime of tokens issued at login (minutes)
    pub session_ttl_minutes: i64,

    /// Fallback lifetime when no explicit one is requested (minutes)
    pub access_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("GUILDHALL_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,

            database_url: env::var("GUILDHALL_DB_URL")
                .unwrap_or_else(|_| "sqlite://guildhall.db".to_string()),

            token_key: env::var("GUILDHALL_TOKEN_KEY").ok(),

            session_ttl_minutes: env::var("GUILDHALL_SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,

            access_ttl_minutes: env::var("GUILDHALL_ACCESS_TTL_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // single test: the env is process-wide, so the unset and malformed
    // cases must not run concurrently
    #[test]
    fn test_from_env_defaults_and_malformed_values() {
        env::remove_var("GUILDHALL_PORT");
        env::remove_var("GUILDHALL_DB_URL");
        env::remove_var("GUILDHALL_TOKEN_KEY");
        env::remove_var("GUILDHALL_SESSION_TTL_MINUTES");
        env::remove_var("GUILDHALL_ACCESS_TTL_MINUTES");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_url, "sqlite://guildhall.db");
        assert!(config.token_key.is_none());
        assert_eq!(config.session_ttl_minutes, 300);
        assert_eq!(config.access_ttl_minutes, 15);

        // malformed values abort startup instead of silently defaulting
        env::set_var("GUILDHALL_SESSION_TTL_MINUTES", "five-hours");
        assert!(Config::from_env().is_err());
        env::remove_var("GUILDHALL_SESSION_TTL_MINUTES");

        env::set_var("GUILDHALL_PORT", "not-a-port");
        assert!(Config::from_env().is_err());
        env::remove_var("GUILDHALL_PORT");
    }
}
