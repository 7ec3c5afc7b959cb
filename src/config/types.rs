use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// Prefix for environment overrides, e.g. `AROUND_API__BASE_URL`.
pub const ENV_PREFIX: &str = "AROUND_";

const DEFAULT_API_URL: &str = "https://around-api.es.tripleten-services.com/v1";
const DEFAULT_AUTH_URL: &str = "https://se-register-api.en.tripleten-services.com/v1";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: where the two backends live, where the token is
/// kept and how we log.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The resource API (users, cards).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. Requests never time out when unset.
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_in_ms: None,
        }
    }
}

/// The authentication API (signup, signin, token check).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthConfig {
    pub base_url: String,
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AUTH_URL.to_string(),
            timeout_in_ms: None,
        }
    }
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from a YAML file, then apply `AROUND_*` environment overrides.
/// A missing file is not an error: built-in defaults are used.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    extract(
        base_figment()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Parse config from an in-memory YAML document (no environment overrides).
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(base_figment().merge(Yaml::string(yaml)))
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
