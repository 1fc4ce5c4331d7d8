//! Configuration loading and management.
//!
//! Every section is optional; an empty file yields a working local setup.

use crate::model::AuthorizedApp;
use command_framework::DispatchConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Bootstrap configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the API is served.
    pub server: ServerConfig,
    /// Backing database connection.
    pub database: DatabaseConfig,
    /// Request and response encodings.
    pub format: FormatConfig,
    /// Command dispatch behavior.
    pub dispatch: DispatchSettings,
    pub logging: LoggingConfig,
    /// Apps provisioned into the `AuthorizedApps` resource at boot.
    pub authorized_apps: Vec<AuthorizedApp>,
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
    /// Serve over TLS.
    pub https: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8080,
            https: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub hostname: String,
    pub port: Option<u16>,
    pub name: String,
    pub password: Option<String>,
    /// Cluster seed nodes, for databases that use them.
    pub contact_points: Vec<String>,
    pub keyspace: Option<String>,
}

/// Encodings accepted on input and produced on output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub input: WireFormat,
    pub output: WireFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireFormat {
    #[default]
    Json,
}

/// The `[dispatch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Prefix of synthesized kinds (`"<namespace>#<type>"`).
    pub namespace: String,
    /// Budget for requests that carry no timeout of their own.
    pub timeout_ms: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            namespace: command_framework::dispatcher::DEFAULT_NAMESPACE.to_string(),
            timeout_ms: u64::try_from(command_framework::dispatcher::DEFAULT_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Install the stdout subscriber at boot.
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { stdout: true }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.timeout_ms must be greater than zero".to_string(),
            ));
        }
        let namespace = &self.dispatch.namespace;
        if namespace.is_empty() || namespace.contains('#') {
            return Err(ConfigError::Invalid(format!(
                "dispatch.namespace {namespace:?} must be non-empty and must not contain '#'"
            )));
        }
        if let Some(app) = self.authorized_apps.iter().find(|app| app.project_id.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "authorized app {:?} has an empty project_id",
                app.display_name
            )));
        }
        Ok(())
    }

    /// The dispatcher's view of this configuration.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            namespace: self.dispatch.namespace.clone(),
            default_timeout: Duration::from_millis(self.dispatch.timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.https);
        assert_eq!(config.format.input, WireFormat::Json);
        assert!(config.logging.stdout);
        assert_eq!(config.dispatch_config(), DispatchConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            hostname = "weave.local"
            port = 8443
            https = true

            [database]
            hostname = "db.local"
            name = "weave"
            contact_points = ["10.0.0.1", "10.0.0.2"]
            keyspace = "weave"

            [format]
            input = "JSON"
            output = "JSON"

            [dispatch]
            namespace = "acme"
            timeout_ms = 1500

            [logging]
            stdout = false

            [[authorized_apps]]
            project_id = "home-automation"
            display_name = "Home"

            [[authorized_apps.android_apps]]
            package_name = "com.example.home"
            certificate_hash = "AB:CD"
            "#,
        )
        .unwrap();

        assert!(config.server.https);
        assert_eq!(config.database.contact_points.len(), 2);
        assert!(config.database.password.is_none());
        assert!(!config.logging.stdout);
        assert_eq!(config.authorized_apps[0].android_apps[0].package_name, "com.example.home");

        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.namespace, "acme");
        assert_eq!(dispatch.default_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_unsupported_format_is_a_parse_error() {
        let err = Config::from_toml_str("[format]\ninput = \"CBOR\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_toml_str("[dispatch]\ntimeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml_str("[dispatch]\nnamespace = \"a#b\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml_str("[[authorized_apps]]\nproject_id = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/definitely/not/here/weave.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
