use std::path::PathBuf;

use crate::error::StashError;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 9999;

/// Connection settings for a Stash server's GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Value of the `session` cookie obtained from a web login.
    pub session_cookie: Option<String>,
    /// API key generated in the server's security settings.
    pub api_key: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_cookie: None,
            api_key: None,
        }
    }
}

/// TOML config file format.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    stash: Option<StashConfig>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct StashConfig {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    session_cookie: Option<String>,
    api_key: Option<String>,
}

impl ConnectionConfig {
    /// The GraphQL endpoint URL this configuration points at.
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}/graphql", self.scheme, self.host, self.port)
    }

    /// Load connection settings from environment variables or the config file.
    ///
    /// Priority: env vars > config file > defaults. Recognized env vars:
    /// STASH_SCHEME, STASH_HOST, STASH_PORT, STASH_SESSION_COOKIE,
    /// STASH_API_KEY.
    pub fn load() -> Result<Self, StashError> {
        let config = load_config_file();

        let scheme = std::env::var("STASH_SCHEME")
            .ok()
            .or_else(|| config.as_ref().and_then(|c| c.scheme.clone()))
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string());

        let host = std::env::var("STASH_HOST")
            .ok()
            .or_else(|| config.as_ref().and_then(|c| c.host.clone()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match std::env::var("STASH_PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                StashError::Config(format!("STASH_PORT is not a valid port number: \"{raw}\""))
            })?,
            Err(_) => config.as_ref().and_then(|c| c.port).unwrap_or(DEFAULT_PORT),
        };

        let session_cookie = std::env::var("STASH_SESSION_COOKIE")
            .ok()
            .or_else(|| config.as_ref().and_then(|c| c.session_cookie.clone()));

        let api_key = std::env::var("STASH_API_KEY")
            .ok()
            .or_else(|| config.as_ref().and_then(|c| c.api_key.clone()));

        Ok(Self {
            scheme,
            host,
            port,
            session_cookie,
            api_key,
        })
    }

    /// Apply explicit values (e.g., from CLI args) over the loaded config.
    pub fn with_overrides(
        mut self,
        scheme: Option<String>,
        host: Option<String>,
        port: Option<u16>,
        api_key: Option<String>,
    ) -> Self {
        if let Some(scheme) = scheme {
            self.scheme = scheme;
        }
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
        self
    }
}

/// Return the path to the connection config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stash-client").join("config.toml"))
}

/// Save connection settings to the config file, creating parent directories
/// as needed. Fields that match the defaults are omitted from the file.
/// Returns the path the file was written to.
pub fn save_to_file(config: &ConnectionConfig) -> Result<PathBuf, StashError> {
    let path = config_path()
        .ok_or_else(|| StashError::Config("Could not determine config directory".to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StashError::Config(e.to_string()))?;
    }

    let file = ConfigFile {
        stash: Some(StashConfig {
            scheme: if config.scheme == DEFAULT_SCHEME {
                None
            } else {
                Some(config.scheme.clone())
            },
            host: if config.host == DEFAULT_HOST {
                None
            } else {
                Some(config.host.clone())
            },
            port: if config.port == DEFAULT_PORT {
                None
            } else {
                Some(config.port)
            },
            session_cookie: config.session_cookie.clone(),
            api_key: config.api_key.clone(),
        }),
    };

    let toml_str = toml::to_string_pretty(&file)
        .map_err(|e| StashError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(&path, toml_str).map_err(|e| StashError::Config(e.to_string()))?;
    Ok(path)
}

fn load_config_file() -> Option<StashConfig> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let config: ConfigFile = toml::from_str(&content).ok()?;
    config.stash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = ConnectionConfig::default();
        assert_eq!(config.endpoint(), "http://localhost:9999/graphql");
    }

    #[test]
    fn test_endpoint_with_overrides() {
        let config = ConnectionConfig::default().with_overrides(
            Some("https".to_string()),
            Some("stash.home".to_string()),
            Some(443),
            None,
        );
        assert_eq!(config.endpoint(), "https://stash.home:443/graphql");
    }

    #[test]
    fn test_overrides_keep_unset_fields() {
        let config = ConnectionConfig::default().with_overrides(
            None,
            None,
            Some(8080),
            Some("key".to_string()),
        );
        assert_eq!(config.scheme, "http");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_key.as_deref(), Some("key"));
    }
}
