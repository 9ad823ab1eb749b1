use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_USERNAME,
    DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_MISTRAL_API_URL, DEFAULT_MISTRAL_MODEL,
    DEFAULT_PORT, DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Authentication configuration section
#[derive(Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub session_ttl_hours: Option<u32>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
}

impl std::fmt::Debug for AuthFileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFileConfig")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[REDACTED]"))
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

/// Chat completion configuration section
#[derive(Default, Clone, Deserialize)]
pub struct GenerationFileConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for GenerationFileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationFileConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub generation: Option<GenerationFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str = map.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.session_ttl_hours.is_some() {
                current.session_ttl_hours = auth.session_ttl_hours;
            }
            if auth.admin_username.is_some() {
                current.admin_username = auth.admin_username;
            }
            if auth.admin_password.is_some() {
                current.admin_password = auth.admin_password;
            }
            if auth.admin_email.is_some() {
                current.admin_email = auth.admin_email;
            }
        }

        if let Some(generation) = other.generation {
            let current = self
                .generation
                .get_or_insert_with(GenerationFileConfig::default);
            if generation.api_url.is_some() {
                current.api_url = generation.api_url;
            }
            if generation.api_key.is_some() {
                current.api_key = generation.api_key;
            }
            if generation.model.is_some() {
                current.model = generation.model;
            }
            if generation.timeout_secs.is_some() {
                current.timeout_secs = generation.timeout_secs;
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub session_ttl_hours: u32,
    pub admin_username: String,
    /// None means a random password is generated when the admin is first seeded
    pub admin_password: Option<String>,
    pub admin_email: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[REDACTED]"))
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

/// Chat completion configuration
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_url: String,
    /// None disables the generation endpoints (they answer 503)
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub generation: GenerationConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.holonet/holonet.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;

        tracing::debug!(config = ?config, "Configuration resolved");
        Ok(config)
    }

    /// Layer CLI/env values over file values over defaults
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_generation = file_config.generation.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let auth = AuthConfig {
            session_ttl_hours: cli
                .session_ttl_hours
                .or(file_auth.session_ttl_hours)
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            admin_username: file_auth
                .admin_username
                .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: cli
                .admin_password
                .clone()
                .or(file_auth.admin_password)
                .filter(|p| !p.is_empty()),
            admin_email: file_auth
                .admin_email
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
        };

        let generation = GenerationConfig {
            api_url: cli
                .mistral_api_url
                .clone()
                .or(file_generation.api_url)
                .unwrap_or_else(|| DEFAULT_MISTRAL_API_URL.to_string()),
            api_key: cli
                .mistral_api_key
                .clone()
                .or(file_generation.api_key)
                .filter(|k| !k.trim().is_empty()),
            model: cli
                .mistral_model
                .clone()
                .or(file_generation.model)
                .unwrap_or_else(|| DEFAULT_MISTRAL_MODEL.to_string()),
            timeout_secs: file_generation
                .timeout_secs
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
        };

        Self {
            server,
            auth,
            generation,
            debug: cli.debug || file_config.debug.unwrap_or(false),
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.auth.session_ttl_hours == 0 {
            anyhow::bail!("Configuration error: auth.session_ttl_hours must be greater than 0");
        }
        if self.auth.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            anyhow::bail!(
                "Configuration error: auth.session_ttl_hours must be at most {}",
                MAX_SESSION_TTL_HOURS
            );
        }
        if self.auth.admin_username.trim().is_empty() {
            anyhow::bail!("Configuration error: auth.admin_username must not be empty");
        }
        if self.generation.api_url.trim().is_empty() {
            anyhow::bail!("Configuration error: generation.api_url must not be empty");
        }
        if reqwest::Url::parse(&self.generation.api_url).is_err() {
            anyhow::bail!(
                "Configuration error: generation.api_url is not a valid URL: {}",
                self.generation.api_url
            );
        }
        if self.generation.model.trim().is_empty() {
            anyhow::bail!("Configuration error: generation.model must not be empty");
        }
        if self.generation.timeout_secs == 0 {
            anyhow::bail!("Configuration error: generation.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

/// Get the profile config path (~/.holonet/holonet.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered(cli: &CliConfig, json: &str) -> AppConfig {
        let file: FileConfig = serde_json::from_str(json).unwrap();
        AppConfig::from_layers(cli, file)
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "auth": { "session_ttl_hours": 12, "admin_password": "s3cret" },
            "generation": { "api_key": "k", "model": "mistral-large-latest", "timeout_secs": 5 },
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));
        assert_eq!(config.auth.as_ref().unwrap().session_ttl_hours, Some(12));
        assert_eq!(
            config.generation.as_ref().unwrap().model.as_deref(),
            Some("mistral-large-latest")
        );
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.auth.is_none());
        assert!(config.generation.is_none());
    }

    #[test]
    fn test_file_config_extra_fields_collected() {
        let json = r#"{ "servr": { "port": 1 }, "debug": false }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let extra = config.extra.as_object().unwrap();
        assert!(extra.contains_key("servr"));
        assert!(!extra.contains_key("debug"));
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{ "server": { "host": "a", "port": 1 }, "generation": { "model": "m1" } }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 2 }, "generation": { "api_key": "k" }, "debug": true }"#,
        )
        .unwrap();
        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("a"));
        assert_eq!(server.port, Some(2));
        let generation = base.generation.unwrap();
        assert_eq!(generation.model.as_deref(), Some("m1"));
        assert_eq!(generation.api_key.as_deref(), Some("k"));
        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = layered(&CliConfig::default(), "{}");
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.auth.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(config.auth.admin_username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(config.auth.admin_email, DEFAULT_ADMIN_EMAIL);
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.generation.api_url, DEFAULT_MISTRAL_API_URL);
        assert_eq!(config.generation.model, DEFAULT_MISTRAL_MODEL);
        assert!(config.generation.api_key.is_none());
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            debug: true,
            session_ttl_hours: Some(2),
            mistral_api_key: Some("cli-key".to_string()),
            ..Default::default()
        };
        let config = layered(
            &cli,
            r#"{
                "server": { "host": "file.host", "port": 4000 },
                "auth": { "session_ttl_hours": 48 },
                "generation": { "api_key": "file-key", "model": "file-model" }
            }"#,
        );

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.session_ttl_hours, 2);
        assert_eq!(config.generation.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.generation.model, "file-model");
        assert!(config.debug);
    }

    #[test]
    fn test_app_config_blank_api_key_is_none() {
        let config = layered(&CliConfig::default(), r#"{ "generation": { "api_key": "  " } }"#);
        assert!(config.generation.api_key.is_none());
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let config = layered(&CliConfig::default(), r#"{ "server": { "port": 0 } }"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let config = layered(&cli, "{}");
        assert!(config.validate().unwrap_err().to_string().contains("server.host"));
    }

    #[test]
    fn test_app_config_validation_ttl_zero() {
        let config = layered(&CliConfig::default(), r#"{ "auth": { "session_ttl_hours": 0 } }"#);
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("session_ttl_hours")
        );
    }

    #[test]
    fn test_app_config_validation_ttl_upper_bound() {
        let config = layered(
            &CliConfig::default(),
            r#"{ "auth": { "session_ttl_hours": 4000000000 } }"#,
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("session_ttl_hours"), "{}", err);
        assert!(err.contains("at most"), "{}", err);

        let config = layered(
            &CliConfig::default(),
            &format!(
                r#"{{ "auth": {{ "session_ttl_hours": {} }} }}"#,
                MAX_SESSION_TTL_HOURS
            ),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_validation_bad_url() {
        let config = layered(
            &CliConfig::default(),
            r#"{ "generation": { "api_url": "not a url" } }"#,
        );
        assert!(config.validate().unwrap_err().to_string().contains("api_url"));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = layered(
            &CliConfig::default(),
            r#"{ "auth": { "admin_password": "pw-123" }, "generation": { "api_key": "sk-456" } }"#,
        );
        let out = format!("{:?}", config);
        assert!(!out.contains("pw-123"));
        assert!(!out.contains("sk-456"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
    }
}
