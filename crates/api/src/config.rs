//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// API server configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Admin basic-auth user name.
    pub admin_username: String,
    /// Admin basic-auth password.
    pub admin_password: String,
    /// Directory holding the browser front-end.
    pub static_dir: PathBuf,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
    /// Sessions untouched for this many days are pruned at startup.
    pub session_max_age_days: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("database_url", &self.database_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("static_dir", &self.static_dir)
            .field("secure_cookies", &self.secure_cookies)
            .field("session_max_age_days", &self.session_max_age_days)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `API_ADDR` | Server bind address | `0.0.0.0:$PORT` |
    /// | `PORT` | Port when `API_ADDR` is unset | `5000` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:persona.db?mode=rwc` |
    /// | `ADMIN_USERNAME` | Admin user name | `admin` |
    /// | `ADMIN_PASSWORD` | Admin password | `password` |
    /// | `STATIC_DIR` | Front-end directory | `static` |
    /// | `SESSION_COOKIE_SECURE` | Mark the session cookie `Secure` | `false` |
    /// | `SESSION_MAX_AGE_DAYS` | Prune sessions older than this | `30` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = match env::var("API_ADDR") {
            Ok(addr) => addr.parse().map_err(|_| ConfigError::InvalidAddr)?,
            Err(_) => {
                let port: u16 = env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort)?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:persona.db?mode=rwc".to_string());

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "password".to_string());

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let secure_cookies = env::var("SESSION_COOKIE_SECURE")
            .ok()
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let session_max_age_days = env::var("SESSION_MAX_AGE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            addr,
            database_url,
            admin_username,
            admin_password,
            static_dir,
            secure_cookies,
            session_max_age_days,
        })
    }

    /// Whether the admin credentials are still the shipped defaults.
    pub fn uses_default_credentials(&self) -> bool {
        self.admin_username == "admin" && self.admin_password == "password"
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_ADDR format")]
    InvalidAddr,

    #[error("Invalid PORT value")]
    InvalidPort,
}
