//! Environment-driven service configuration.

use std::net::SocketAddr;

use thiserror::Error;

use tutoria_core::UserId;

pub const BIND_ADDR_VAR: &str = "TUTORIA_BIND_ADDR";
pub const BOOTSTRAP_ADMINS_VAR: &str = "TUTORIA_BOOTSTRAP_ADMINS";
pub const SEED_DEMO_VAR: &str = "TUTORIA_SEED_DEMO";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a socket address")]
    InvalidBindAddr { var: &'static str, value: String },

    #[error("{var}: '{value}' is not a user id")]
    InvalidUserId { var: &'static str, value: String },

    #[error("{var}: expected true/false, got '{value}'")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Users always granted the Administrator role.
    pub bootstrap_admins: Vec<UserId>,
    /// Seed demo pending requests at startup.
    pub seed_demo: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            bootstrap_admins: Vec::new(),
            seed_demo: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let raw_addr = get(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let bootstrap_admins = match get(BOOTSTRAP_ADMINS_VAR) {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<UserId>().map_err(|_| ConfigError::InvalidUserId {
                        var: BOOTSTRAP_ADMINS_VAR,
                        value: s.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let seed_demo = match get(SEED_DEMO_VAR) {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool {
                var: SEED_DEMO_VAR,
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            bind_addr,
            bootstrap_admins,
            seed_demo,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
