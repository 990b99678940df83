use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

const CONFIG_FILE: &str = "config.json";
const SEARCH_DIRS: [&str; 2] = [".", "./backend"];

/// Connection parameters read from `config.json` under the `database` key.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(deserialize_with = "port_from_any")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

// The legacy file stores the port as a string; accept both forms.
fn port_from_any<'de, D>(de: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Num(u16),
        Str(String),
    }
    match Port::deserialize(de)? {
        Port::Num(p) => Ok(p),
        Port::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(PgSslMode::Disable)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base used to build the public URL stored with each book.
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub cors_origin: String,
}

impl AppConfig {
    /// Database settings come from the config file, everything else from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = match std::env::var("CONFIG_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => find_config_file().context("config.json not found in . or ./backend")?,
        };
        let database = Self::read_database(&path)?;

        let endpoint = std::env::var("STORAGE_ENDPOINT").context("STORAGE_ENDPOINT")?;
        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "books".into());
        let storage = StorageConfig {
            public_url: std::env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket)),
            access_key: std::env::var("STORAGE_ACCESS_KEY").context("STORAGE_ACCESS_KEY")?,
            secret_key: std::env::var("STORAGE_SECRET_KEY").context("STORAGE_SECRET_KEY")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint,
            bucket,
        };

        Ok(Self {
            database,
            storage,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        })
    }

    fn read_database(path: &Path) -> anyhow::Result<DatabaseConfig> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let file: ConfigFile = serde_json::from_str(&raw)
            .with_context(|| format!("parse config file {}", path.display()))?;
        tracing::info!(path = %path.display(), host = %file.database.host, "config loaded");
        Ok(file.database)
    }
}

fn find_config_file() -> Option<PathBuf> {
    SEARCH_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(CONFIG_FILE))
        .find(|p| p.is_file())
}
