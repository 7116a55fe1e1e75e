//! Process configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_REFEREE_ROLE: &str = "Arbitro";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Security
    pub jwt_secret: String,
    pub referee_role: String,

    // Match rules override (compiled-in rules when unset)
    pub rules_path: Option<PathBuf>,

    // Finished-match export target (log-only when unset)
    pub export_url: Option<String>,
}

fn missing(name: &str) -> AppError {
    AppError::config(
        format!("{name} must be set"),
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{name} environment variable not found"),
        ),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("PICKBAN_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port_str = lookup("PICKBAN_PORT").unwrap_or_else(|| "3001".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            AppError::config(
                format!("PICKBAN_PORT must be a valid port number, got '{port_str}'"),
                e,
            )
        })?;

        let jwt_secret = non_empty(lookup("PICKBAN_JWT_SECRET"))
            .ok_or_else(|| missing("PICKBAN_JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::config(
                format!(
                    "PICKBAN_JWT_SECRET is too short. It should be at least {MIN_SECRET_LEN} characters."
                ),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "PICKBAN_JWT_SECRET length validation failed",
                ),
            ));
        }

        let referee_role = non_empty(lookup("PICKBAN_REFEREE_ROLE"))
            .unwrap_or_else(|| DEFAULT_REFEREE_ROLE.to_string());
        let rules_path = non_empty(lookup("PICKBAN_RULES_PATH")).map(PathBuf::from);
        let export_url = non_empty(lookup("PICKBAN_EXPORT_URL"));

        Ok(Config {
            host,
            port,
            jwt_secret,
            referee_role,
            rules_path,
            export_url,
        })
    }
}
