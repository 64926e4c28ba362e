use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::validation::validate_config;
use super::{ChatMode, ConfigError, RelayConfig};

pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Resolves the process configuration from the environment.
///
/// Values come from, in increasing priority: built-in defaults, the YAML file
/// named by `RELAY_CONFIG_PATH` (or `./config.yml` if it exists), and the
/// `RELAY_*` / `PORT` environment variables.
pub fn load_config() -> Result<RelayConfig, ConfigError> {
    let path = config_path(|name| env::var(name).ok());
    load_with(path.as_deref(), |name| env::var(name).ok())
}

pub fn config_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_yaml_file(path)?,
        None => RelayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config)?;
    Ok(config)
}

fn load_yaml_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if contents.trim().is_empty() {
        return Ok(RelayConfig::default());
    }

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(url) = get("RELAY_RAG_URL") {
        config.rag.base_url = url;
    }
    if let Some(url) = get("RELAY_INFERENCE_URL") {
        config.inference.base_url = url;
    }
    if let Some(model) = get("RELAY_INFERENCE_MODEL") {
        config.inference.model = model;
    }
    if let Some(mode) = get("RELAY_CHAT_MODE") {
        config.chat.mode = mode
            .parse::<ChatMode>()
            .map_err(|_| ConfigError::InvalidEnv {
                name: "RELAY_CHAT_MODE",
                value: mode.clone(),
            })?;
    }
    if let Some(host) = get("RELAY_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("PORT") {
        config.server.port = port.parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
            name: "PORT",
            value: port.clone(),
        })?;
    }
    if let Some(dir) = get("RELAY_LOG_DIR") {
        config.logging.log_dir = Some(PathBuf::from(dir));
    }

    Ok(())
}
