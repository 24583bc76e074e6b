//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory,
//! overridden by `MERCH__`-prefixed environment variables
//! (`MERCH__SERVER__PORT=8080`, `MERCH__LEDGER__STARTING_BALANCE=500`).
use config::{Config, ConfigError, Environment, File};
use ledger::LedgerConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
            database: default_database(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_database() -> Database {
    Database::Sqlite("merch_store.db".to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("MERCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.server.database,
            Database::Sqlite("merch_store.db".to_string())
        );
        assert_eq!(settings.ledger, LedgerConfig::default());
    }

    #[test]
    fn database_accepts_memory_and_sqlite() {
        let memory: Database = serde_json::from_str(r#""memory""#).unwrap();
        assert_eq!(memory, Database::Memory);

        let file: Database = serde_json::from_str(r#"{"sqlite": "/tmp/x.db"}"#).unwrap();
        assert_eq!(file, Database::Sqlite("/tmp/x.db".to_string()));
    }

    #[test]
    fn ledger_section_overrides_policy() {
        let settings: Settings =
            serde_json::from_str(r#"{"ledger": {"starting_balance": 500}}"#).unwrap();
        assert_eq!(settings.ledger.starting_balance, 500);
        assert_eq!(settings.ledger.max_retries, 5);
    }
}
