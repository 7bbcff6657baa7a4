use airsoft_actions::HandlerSettings;
use airsoft_auth::DEFAULT_SESSION_COOKIE;
use airsoft_database::DatabaseConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub session_cookie: String,
    pub run_migrations: bool,
    /// Seconds between sweeps of expired sessions
    pub session_cleanup_interval: u64,
    pub handlers: HandlerSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database: DatabaseConfig::from_env(),
            session_cookie: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string()),
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            session_cleanup_interval: std::env::var("SESSION_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            handlers: HandlerSettings::from_env(),
        }
    }
}
