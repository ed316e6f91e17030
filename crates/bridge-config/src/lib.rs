use hocon::HoconLoader;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_CSRF_TOKEN_NAME: &str = "dropbox-auth-csrf-token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/redirect_uri";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.dropbox.com/oauth2/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";
pub const DEFAULT_API_URL: &str = "https://api.dropboxapi.com/2";
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 600;

const MASKED: &str = "***MASKED***";

/// Credentials are left empty by `Default` and fail `validate()`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dropbox: DropboxConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Verbose logging; the bridge historically ran with this on.
    #[serde(default = "default_debug")]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DropboxConfig {
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_csrf_token_name")]
    pub csrf_token_name: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_debug() -> bool {
    true
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_csrf_token_name() -> String {
    DEFAULT_CSRF_TOKEN_NAME.to_string()
}

fn default_authorize_url() -> String {
    DEFAULT_AUTHORIZE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECONDS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: default_debug(),
        }
    }
}

impl Default for DropboxConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            csrf_token_name: default_csrf_token_name(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_url: default_api_url(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
        }
    }
}

impl Config {
    /// Load `application.conf` if present, otherwise fall back to the environment.
    pub fn load() -> Result<Self, String> {
        Self::from_hocon().or_else(|e| {
            tracing::warn!(
                "Failed to load HOCON config: {}. Falling back to environment variables.",
                e
            );
            Self::from_env().map_err(|e| format!("Failed to load configuration: {}", e))
        })
    }

    /// Load configuration from HOCON file with environment variable substitution
    pub fn from_hocon() -> Result<Self, String> {
        Self::from_hocon_path("application.conf")
    }

    /// Load configuration from a specific HOCON file path
    pub fn from_hocon_path<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(format!("Configuration file not found: {}", path.display()));
        }

        let mut config: Config = HoconLoader::new()
            .load_file(path)
            .map_err(|e| format!("Failed to load HOCON file: {}", e))?
            .resolve()
            .map_err(|e| format!("Failed to parse and resolve HOCON: {}", e))?;

        config.load_credentials_from_env();

        Ok(config)
    }

    /// Load configuration from `BRIDGE__SECTION__KEY` environment variables.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.debug", default_debug())?
            .set_default("dropbox.app_key", "")?
            .set_default("dropbox.app_secret", "")?
            .set_default("dropbox.redirect_uri", DEFAULT_REDIRECT_URI)?
            .set_default("dropbox.csrf_token_name", DEFAULT_CSRF_TOKEN_NAME)?
            .set_default("dropbox.authorize_url", DEFAULT_AUTHORIZE_URL)?
            .set_default("dropbox.token_url", DEFAULT_TOKEN_URL)?
            .set_default("dropbox.api_url", DEFAULT_API_URL)?
            .set_default("session.ttl_seconds", DEFAULT_SESSION_TTL_SECONDS as i64)?
            .add_source(
                config::Environment::with_prefix("BRIDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.load_credentials_from_env();
        Ok(config)
    }

    /// Apply the conventional `DROPBOX_*` credential variables on top of whatever was loaded.
    fn load_credentials_from_env(&mut self) {
        if let Ok(app_key) = std::env::var("DROPBOX_APP_KEY") {
            self.dropbox.app_key = app_key;
        }
        if let Ok(app_secret) = std::env::var("DROPBOX_APP_SECRET") {
            self.dropbox.app_secret = app_secret;
        }
        if let Ok(redirect_uri) = std::env::var("DROPBOX_REDIRECT_URI") {
            self.dropbox.redirect_uri = redirect_uri;
        }
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<(), String> {
        if self.dropbox.app_key.trim().is_empty() {
            return Err(
                "Dropbox app key is not set. Set DROPBOX_APP_KEY or dropbox.app_key.".to_string(),
            );
        }

        if self.dropbox.app_secret.trim().is_empty() {
            return Err(
                "Dropbox app secret is not set. Set DROPBOX_APP_SECRET or dropbox.app_secret."
                    .to_string(),
            );
        }

        if self.dropbox.csrf_token_name.trim().is_empty() {
            return Err("dropbox.csrf_token_name must not be empty".to_string());
        }

        for (name, value) in [
            ("dropbox.redirect_uri", &self.dropbox.redirect_uri),
            ("dropbox.authorize_url", &self.dropbox.authorize_url),
            ("dropbox.token_url", &self.dropbox.token_url),
            ("dropbox.api_url", &self.dropbox.api_url),
        ] {
            Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", name, e))?;
        }

        if self.server.host.trim().is_empty() {
            return Err("server.host must not be empty".to_string());
        }

        if self.session.ttl_seconds == 0 {
            return Err("session.ttl_seconds must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Produce a version safe to log (secrets masked).
    pub fn sanitized(&self) -> Self {
        let mut clone = self.clone();
        if !clone.dropbox.app_secret.is_empty() {
            clone.dropbox.app_secret = MASKED.to_string();
        }
        clone
    }

    /// `host:port` pair for binding the listener.
    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
