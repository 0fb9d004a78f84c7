use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::{GraphError, Result};

/// Connection parameters for one [`GraphSession`](crate::GraphSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Target database; the server default when `None`.
    pub database: Option<String>,
    pub fetch_size: usize,
    pub max_connections: usize,
    /// Upper bound on the connectivity check in `GraphSession::open`.
    pub connect_timeout: Duration,
}

impl SessionConfig {
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: None,
            fetch_size: 500,
            // One session, one connection.
            max_connections: 1,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Load from `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and the optional
    /// `NEO4J_DATABASE`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            required_env("NEO4J_URI")?,
            required_env("NEO4J_USER")?,
            required_env("NEO4J_PASSWORD")?,
        );
        config.database = env::var("NEO4J_DATABASE").ok().filter(|db| !db.is_empty());
        Ok(config)
    }

    pub fn log_redacted(&self) {
        info!(
            uri = self.uri.as_str(),
            user = self.user.as_str(),
            password = redact(&self.password),
            database = self.database.as_deref().unwrap_or("<default>"),
            fetch_size = self.fetch_size,
            "Neo4j session config"
        );
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| GraphError::Config(format!("{key} environment variable is required")))
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "********"
    }
}
