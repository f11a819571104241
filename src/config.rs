use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const API_KEY: &str = "openai.api_key";
pub const BASE_URL: &str = "openai.base_url";
pub const MODEL: &str = "openai.model";
pub const TIMEOUT_SECS: &str = "openai.timeout_secs";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Dotted-key configuration values, e.g. from the TOML file plus CLI flags.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// A snapshot of environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

impl ConfigStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

/// `openai.api_key` → `OPENAI_API_KEY`
pub fn env_name(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

/// API key and optional endpoint override for the completion service.
#[derive(Clone)]
pub struct BackendCredentials {
    pub api_key: String,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Resolves backend settings from a config store, falling back to the
/// environment. Pure: no I/O beyond reading the two sources.
#[derive(Clone, Copy)]
pub struct BackendConfig<'a> {
    store: &'a dyn ConfigStore,
    env: &'a dyn EnvSource,
}

impl<'a> BackendConfig<'a> {
    pub fn new(store: &'a dyn ConfigStore, env: &'a dyn EnvSource) -> Self {
        BackendConfig { store, env }
    }

    /// Precedence:
    ///   1. config store (`openai.api_key`, `openai.base_url`)
    ///   2. env vars (`OPENAI_API_KEY`, `OPENAI_BASE_URL`)
    ///
    /// A missing key is an error; a missing base URL means the default endpoint.
    pub fn resolve(&self) -> Result<BackendCredentials, ConfigError> {
        let api_key = self
            .lookup(API_KEY)
            .ok_or_else(|| ConfigError::MissingCredentials {
                key: API_KEY.to_string(),
                env: env_name(API_KEY),
            })?;
        let base_url = self.lookup(BASE_URL);

        Ok(BackendCredentials { api_key, base_url })
    }

    pub fn model(&self) -> String {
        self.lookup(MODEL)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// Request timeout; must be a positive number of seconds.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        let Some(raw) = self.lookup(TIMEOUT_SECS) else {
            return Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        };

        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidValue {
                key: TIMEOUT_SECS.to_string(),
                value: raw,
                reason: "expected a positive number of seconds",
            }),
        }
    }

    /// First non-blank value from the store, then the environment.
    fn lookup(&self, key: &str) -> Option<String> {
        non_blank(self.store.get(key)).or_else(|| non_blank(self.env.var(&env_name(key))))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Return `~/.config/send-pr.toml`
pub fn default_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("send-pr.toml"))
}

/// Load the config file into a flat dotted-key store.
///
/// An explicit path must exist; the default path is optional.
pub fn load_store(explicit: Option<&Path>) -> Result<BTreeMap<String, String>, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                log::debug!("No config file found; using environment and defaults");
                return Ok(BTreeMap::new());
            }
        },
    };

    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let store = parse_store(&data).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    log::info!("Using config file: {}", path.display());
    Ok(store)
}

fn parse_store(data: &str) -> Result<BTreeMap<String, String>, toml::de::Error> {
    let table: toml::Table = toml::from_str(data)?;
    let mut store = BTreeMap::new();
    flatten("", &table, &mut store);
    Ok(store)
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let scalar = match value {
            toml::Value::Table(inner) => {
                flatten(&full, inner, out);
                continue;
            }
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => {
                log::warn!("Ignoring unsupported config value for `{full}`: {other}");
                continue;
            }
        };
        out.insert(full, scalar);
    }
}
