/// Configuration management for guest credential resolution
use crate::error::{CredsError, CredsResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Location of the default file store
pub const DEFAULT_FILE_STORE_PATH: &str = "./data/guest-credentials.json";

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Region hosting the identity pool
    pub region: String,
    /// Custom federation endpoint (local or test services)
    pub endpoint: Option<String>,
    /// Identity pool to resolve against
    pub identity_pool_id: String,
    /// Emit diagnostic tracing for cache decisions
    pub debug: bool,
    /// Request timeout for federation calls
    pub http_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            identity_pool_id: String::new(),
            debug: false,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl ResolverConfig {
    /// Configuration for a pool in the default region
    pub fn new(identity_pool_id: impl Into<String>) -> Self {
        Self {
            identity_pool_id: identity_pool_id.into(),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> CredsResult<Self> {
        dotenv::dotenv().ok();

        let identity_pool_id = env::var("IDENTITY_POOL_ID")
            .map_err(|_| CredsError::Validation("IDENTITY_POOL_ID required".to_string()))?;
        let region = env::var("COGNITO_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        let endpoint = env::var("COGNITO_ENDPOINT").ok().filter(|s| !s.is_empty());
        let debug = env::var("GUEST_CREDENTIALS_DEBUG")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let http_timeout = env::var("GUEST_CREDENTIALS_HTTP_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| CredsError::Validation("Invalid HTTP timeout".to_string()))?;

        let config = ResolverConfig {
            region,
            endpoint,
            identity_pool_id,
            debug,
            http_timeout,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CredsResult<()> {
        if self.identity_pool_id.trim().is_empty() {
            return Err(CredsError::Validation(
                "Identity pool id cannot be empty".to_string(),
            ));
        }

        if self.region.trim().is_empty() {
            return Err(CredsError::Validation("Region cannot be empty".to_string()));
        }

        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(CredsError::Validation(format!(
                    "Endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
        }

        Ok(())
    }

    /// URL federation requests are posted to
    pub fn federation_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cognito-identity.{}.amazonaws.com/", self.region),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreConfig {
    File { path: PathBuf },
    Memory,
    Sqlite { path: PathBuf },
    Redis { url: String, key_prefix: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: PathBuf::from(DEFAULT_FILE_STORE_PATH),
        }
    }
}

impl StoreConfig {
    /// Load storage selection from environment variables
    pub fn from_env() -> CredsResult<Self> {
        dotenv::dotenv().ok();

        let kind = env::var("GUEST_CREDENTIALS_STORE").unwrap_or_else(|_| "file".to_string());
        let path = env::var("GUEST_CREDENTIALS_PATH").ok().map(PathBuf::from);

        match kind.to_lowercase().as_str() {
            "file" => Ok(StoreConfig::File {
                path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_STORE_PATH)),
            }),
            "sqlite" => Ok(StoreConfig::Sqlite {
                path: path.unwrap_or_else(|| PathBuf::from("./data/guest-credentials.sqlite")),
            }),
            "redis" => Ok(StoreConfig::Redis {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                key_prefix: env::var("GUEST_CREDENTIALS_KEY_PREFIX")
                    .unwrap_or_else(|_| "guest:".to_string()),
            }),
            "memory" => Ok(StoreConfig::Memory),
            other => Err(CredsError::Validation(format!(
                "Unknown store type: {}",
                other
            ))),
        }
    }
}
