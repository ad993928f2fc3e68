use std::env;

use crate::error::PlasmaError;
use crate::types::Address;

/// Indexer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    // Storage. No URL means the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,

    // Only events emitted by this contract are reduced, when set.
    pub source_address: Option<Address>,

    // Logging
    pub log_json: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 5,
            source_address: None,
            log_json: false,
        }
    }
}

impl IndexerConfig {
    pub fn from_env() -> Result<Self, PlasmaError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: match env::var("PLASMA_DB_MAX_CONNECTIONS") {
                Ok(raw) => raw.parse().map_err(|_| {
                    PlasmaError::Config(format!(
                        "PLASMA_DB_MAX_CONNECTIONS must be a number, got {raw}"
                    ))
                })?,
                Err(_) => defaults.db_max_connections,
            },
            source_address: match env::var("PLASMA_SOURCE_ADDRESS") {
                Ok(raw) if !raw.is_empty() => Some(raw.parse()?),
                _ => None,
            },
            log_json: env::var("PLASMA_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.log_json),
        };

        Ok(config)
    }

    /// Log the effective config without leaking database credentials.
    pub fn log_redacted(&self) {
        fn redact_url(url: &str) -> String {
            match (url.find("://"), url.rfind('@')) {
                (Some(scheme), Some(at)) if at > scheme => {
                    format!("{}://***{}", &url[..scheme], &url[at..])
                }
                _ => url.to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!(
            "  DATABASE_URL: {}",
            self.database_url
                .as_deref()
                .map(redact_url)
                .unwrap_or_else(|| "<not set, using in-memory store>".to_string())
        );
        tracing::info!("  PLASMA_DB_MAX_CONNECTIONS: {}", self.db_max_connections);
        tracing::info!(
            "  PLASMA_SOURCE_ADDRESS: {}",
            self.source_address
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "<any>".to_string())
        );
    }
}
