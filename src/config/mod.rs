//! Configuration loading
//!
//! Settings come from an optional YAML file (path in `PORTAL_CONFIG`) and are
//! then overridden by environment variables.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 5000
//!   allowed_origins: ["http://localhost:5173"]
//! auth:
//!   jwt_secret: change-me
//!   token_ttl_hours: 24
//! email:
//!   frontend_url: http://localhost:5173
//! ```

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

/// Environment variable naming the YAML configuration file
pub const CONFIG_PATH_ENV: &str = "PORTAL_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS origins allowed to call the API; empty allows none
    pub allowed_origins: Vec<String>,
    pub event_bus_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            event_bus_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MongoDB connection string; in-memory stores are used when absent
    pub url: Option<String>,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            name: "tenant_portal".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Brevo API key; reset emails are only logged when absent
    pub brevo_api_key: Option<String>,
    pub from: String,
    pub sender_name: String,
    /// Base URL of the front end, used to build reset links
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            brevo_api_key: None,
            from: "no-reply@tenant-portal.local".to_string(),
            sender_name: "Tenant Portal".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

/// Administrator account created on startup if missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSeed {
    #[serde(default = "default_admin_name")]
    pub name: String,
    pub email: String,
    pub password: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Load from `PORTAL_CONFIG` (if set) plus the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment-style lookups
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_value("PORT", &port)?;
        }
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(capacity) = get("EVENT_BUS_CAPACITY") {
            self.server.event_bus_capacity = parse_value("EVENT_BUS_CAPACITY", &capacity)?;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(name) = get("DATABASE_NAME") {
            self.database.name = name;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = get("TOKEN_TTL_HOURS") {
            self.auth.token_ttl_hours = parse_value("TOKEN_TTL_HOURS", &ttl)?;
        }
        if let Some(key) = get("BREVO_API_KEY") {
            self.email.brevo_api_key = Some(key);
        }
        if let Some(from) = get("EMAIL_FROM") {
            self.email.from = from;
        }
        if let Some(name) = get("EMAIL_SENDER_NAME") {
            self.email.sender_name = name;
        }
        if let Some(url) = get("FRONTEND_URL") {
            self.email.frontend_url = url.trim_end_matches('/').to_string();
        }

        if let (Some(email), Some(password)) = (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            self.admin = Some(AdminSeed {
                name: get("ADMIN_NAME").unwrap_or_else(default_admin_name),
                email,
                password,
            });
        }

        Ok(())
    }

    /// Check that required settings are present and sane
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "JWT_SECRET".to_string(),
            });
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "TOKEN_TTL_HOURS".to_string(),
                value: self.auth.token_ttl_hours.to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.server.event_bus_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "EVENT_BUS_CAPACITY".to_string(),
                value: "0".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Configuration usable in tests and local development
    pub fn default_config() -> Self {
        let mut config = Self::default();
        config.auth.jwt_secret = "development-secret".to_string();
        config
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_require_secret() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
        assert!(AppConfig::default_config().validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("PORT", "8080"),
                ("JWT_SECRET", "s3cret"),
                ("ALLOWED_ORIGINS", "http://a.test/, http://b.test"),
                ("FRONTEND_URL", "https://portal.test/"),
                ("ADMIN_EMAIL", "root@portal.test"),
                ("ADMIN_PASSWORD", "changeme"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.email.frontend_url, "https://portal.test");
        let admin = config.admin.unwrap();
        assert_eq!(admin.email, "root@portal.test");
        assert_eq!(admin.name, "Administrator");
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "PORT"));
    }

    #[test]
    fn test_admin_needs_email_and_password() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("ADMIN_EMAIL", "root@portal.test")])).unwrap();
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_from_yaml_str_partial() {
        let config = AppConfig::from_yaml_str(
            r#"
server:
  port: 7000
auth:
  jwt_secret: yaml-secret
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "yaml-secret");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database:\n  url: mongodb://localhost:27017\n  name: rentals\nauth:\n  jwt_secret: file-secret"
        )
        .unwrap();

        let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.url.as_deref(), Some("mongodb://localhost:27017"));
        assert_eq!(config.database.name, "rentals");
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = AppConfig::from_yaml_file("/nonexistent/portal.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }

    #[test]
    fn test_from_yaml_str_invalid() {
        let err = AppConfig::from_yaml_str("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
