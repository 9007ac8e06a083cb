//! Session lifecycle.

use super::PostgresSource;
use crate::config::ConnectionConfig;
use crate::error::DbExportError;
use crate::Result;
use sqlx::{Connection, PgConnection};

impl PostgresSource {
    /// Opens the session described by `config`.
    ///
    /// Fails immediately on bad credentials or an unreachable server; there
    /// is no retry.
    ///
    /// # Errors
    /// Returns a configuration error for invalid parameters and a connection
    /// error if the server cannot be reached or rejects the login.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let target = config.to_string();

        tracing::debug!("Opening session to {}", target);
        let mut conn = PgConnection::connect_with(&config.connect_options())
            .await
            .map_err(|e| DbExportError::connection_failed(target.clone(), e))?;

        if config.read_only {
            sqlx::query("SET default_transaction_read_only = on")
                .execute(&mut conn)
                .await
                .map_err(|e| DbExportError::connection_failed(target.clone(), e))?;
        }

        match sqlx::query_scalar::<_, String>("SHOW server_version")
            .fetch_one(&mut conn)
            .await
        {
            Ok(version) => tracing::debug!("Connected to PostgreSQL {}", version),
            Err(e) => tracing::debug!("Could not read server version: {}", e),
        }

        Ok(Self { conn, target })
    }

    /// Human-readable `host:port/database` of the session.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Closes the session, sending a graceful terminate to the server.
    ///
    /// # Errors
    /// Returns a connection error if the terminate message cannot be sent
    pub async fn close(self) -> Result<()> {
        let Self { conn, target } = self;
        conn.close()
            .await
            .map_err(|e| DbExportError::connection_failed(target, e))
    }
}
