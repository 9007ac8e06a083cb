//! Export configuration.
//!
//! The connection parameters are fixed defaults. The only override is a full
//! `postgres://` URL, which the binary takes from `DATABASE_URL`.

use crate::credentials::Credentials;
use crate::error::DbExportError;
use crate::Result;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Default database host
pub const DEFAULT_HOST: &str = "localhost";
/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;
/// Default database name
pub const DEFAULT_DATABASE: &str = "rfidr";
/// Default login role
pub const DEFAULT_USER: &str = "postgres";
/// Default password for [`DEFAULT_USER`]
pub const DEFAULT_PASSWORD: &str = "postgres";
/// Schema whose tables are exported
pub const DEFAULT_SCHEMA: &str = "public";
/// Directory the CSV files are written to, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "exports";

/// Parameters for the single database session.
///
/// # Example
/// ```rust
/// use dbexport_core::config::ConnectionConfig;
///
/// let config = ConnectionConfig::from_database_url("postgres://app:pw@db.internal:6432/sales")
///     .expect("valid url");
/// assert_eq!(config.host, "db.internal");
/// assert_eq!(config.port, 6432);
/// assert_eq!(config.to_string(), "db.internal:6432/sales");
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database name
    pub database: String,
    /// Login role and password
    pub credentials: Credentials,
    /// TLS negotiation mode
    pub ssl_mode: PgSslMode,
    /// Whether the session is switched to read-only transactions
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            credentials: Credentials::new(
                DEFAULT_USER.to_string(),
                Some(DEFAULT_PASSWORD.to_string()),
            ),
            ssl_mode: PgSslMode::Prefer,
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never include credentials
        write!(f, "{}:{}/{}", self.host, self.port, self.database)
    }
}

impl ConnectionConfig {
    /// Builds a configuration from a `postgres://` or `postgresql://` URL.
    ///
    /// Parts missing from the URL fall back to the built-in defaults. The
    /// `sslmode` query parameter is honoured; other parameters are ignored.
    ///
    /// # Errors
    /// Returns a configuration error if the URL is malformed, uses another
    /// scheme, has no host, or carries an unknown `sslmode`.
    pub fn from_database_url(database_url: &str) -> Result<Self> {
        let url = Url::parse(database_url).map_err(|e| {
            DbExportError::configuration(format!("Invalid database URL format: {}", e))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DbExportError::configuration(
                "Database URL must use postgres:// or postgresql:// scheme",
            ));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DbExportError::configuration("Database URL must specify a host"))?
            .to_string();

        let mut config = Self {
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            ..Self::default()
        };

        let database = url.path().trim_start_matches('/');
        if !database.is_empty() {
            config.database = decode_component(database, "database name")?;
        }

        let username = if url.username().is_empty() {
            DEFAULT_USER.to_string()
        } else {
            decode_component(url.username(), "username")?
        };
        let password = url
            .password()
            .map(|p| decode_component(p, "password"))
            .transpose()?;
        config.credentials = Credentials::new(username, password);

        for (key, value) in url.query_pairs() {
            if key == "sslmode" {
                config.ssl_mode = PgSslMode::from_str(&value).map_err(|_| {
                    DbExportError::configuration(format!("Unknown sslmode '{}'", value))
                })?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates connection parameters before any network activity.
    ///
    /// # Errors
    /// Returns error if a required value is empty or the port is 0
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(DbExportError::configuration("host cannot be empty"));
        }

        if self.port == 0 {
            return Err(DbExportError::configuration("port must be greater than 0"));
        }

        if self.database.is_empty() {
            return Err(DbExportError::configuration("database cannot be empty"));
        }

        if self.credentials.username().is_empty() {
            return Err(DbExportError::configuration("username cannot be empty"));
        }

        Ok(())
    }

    /// Driver options for this configuration.
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(self.credentials.username())
            .ssl_mode(self.ssl_mode)
            .application_name(&format!("dbexport-{}", env!("CARGO_PKG_VERSION")));

        match self.credentials.password() {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

fn decode_component(raw: &str, what: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DbExportError::configuration(format!("Database URL {} is not valid UTF-8", what)))
}

/// Everything one export run needs.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Session parameters
    pub connection: ConnectionConfig,
    /// Schema whose tables are exported
    pub schema: String,
    /// Directory receiving `<table>.csv` files
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            schema: DEFAULT_SCHEMA.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ExportConfig {
    /// Resolves the run configuration: the URL override if one is given,
    /// the built-in defaults otherwise.
    ///
    /// # Errors
    /// Returns a configuration error if the override URL is invalid
    pub fn resolve(database_url: Option<&str>) -> Result<Self> {
        let connection = match database_url {
            Some(url) => ConnectionConfig::from_database_url(url)?,
            None => ConnectionConfig::default(),
        };

        Ok(Self {
            connection,
            ..Self::default()
        })
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, output_dir: impl AsRef<Path>) -> Self {
        self.output_dir = output_dir.as_ref().to_path_buf();
        self
    }

    /// Builder method to replace the connection parameters.
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }
}
