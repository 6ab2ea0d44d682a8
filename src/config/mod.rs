use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const ENV_PREFIX: &str = "CART";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

/// Where carts and products are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Dynamodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,
    #[serde(default = "default_carts_table")]
    pub carts_table_name: String,
    #[serde(default = "default_products_table")]
    pub products_table_name: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Overrides the DynamoDB endpoint, e.g. for DynamoDB Local
    #[serde(default)]
    pub dynamodb_endpoint_url: Option<String>,
    /// JSON array of products loaded into the in-memory product store
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_enable_tracing")]
    pub enable_tracing: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load configuration from `CART_*` environment variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");
        Self::load(None)
    }

    /// Load configuration from an explicit set of `CART_*` variables instead
    /// of the process environment
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to load configuration: {}", e),
            })?;

        let server = section::<ServerConfig>(&settings, "server")?;
        let database = section::<DatabaseConfig>(&settings, "database")?;
        let observability = section::<ObservabilityConfig>(&settings, "observability")?;

        let config = Config {
            server,
            database,
            observability,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Request timeout cannot be 0".to_string(),
            });
        }

        if self.database.carts_table_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Carts table name cannot be empty".to_string(),
            });
        }

        if self.database.products_table_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Products table name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn section<T: serde::de::DeserializeOwned>(
    settings: &config::Config,
    name: &str,
) -> Result<T, ConfigError> {
    settings
        .clone()
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", name, e),
        })
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Build a DynamoDB client for the configured region and endpoint
    pub async fn dynamodb_client(&self) -> DynamoDbClient {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(self.region.clone()));

        if let Some(endpoint_url) = &self.dynamodb_endpoint_url {
            info!("Using DynamoDB endpoint override: {}", endpoint_url);
            loader = loader.endpoint_url(endpoint_url);
        }

        let aws_config = loader.load().await;
        DynamoDbClient::new(&aws_config)
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024 // 1MB
}

pub(crate) fn default_storage_backend() -> StorageBackend {
    StorageBackend::Dynamodb
}

pub(crate) fn default_carts_table() -> String {
    "ShoppingCarts".to_string()
}

pub(crate) fn default_products_table() -> String {
    "Products".to_string()
}

pub(crate) fn default_region() -> String {
    "us-west-2".to_string()
}

pub(crate) fn default_service_name() -> String {
    "cart-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_enable_tracing() -> bool {
    true
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
