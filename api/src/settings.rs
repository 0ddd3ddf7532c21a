use std::{env, time::Duration};

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::sqlite;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub sqlite: sqlite::Settings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Settings {
    /// Defaults, then `config/default.toml` and `config/local.toml`, then `CLUBS__*`
    /// variables. `DATABASE_URL` and `API_PORT` win over everything else.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("sqlite.url", "sqlite://clubs_app_data.db")?
            .set_default("sqlite.max_connections", 5)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("CLUBS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("sqlite.url", env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", env::var("API_PORT").ok())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
