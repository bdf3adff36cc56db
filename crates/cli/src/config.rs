use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use kuai_core::error::KuaiError;

const CONFIG_PATH: &str = "~/.kuai/config.toml";
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_IMAGE: &str = "tensorflow/tensorflow:1.12.0";

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    namespace: Option<String>,
    user: Option<String>,
    #[serde(rename = "default-image")]
    default_image: Option<String>,
}

/// Per-invocation settings, built once in `main` and passed to every
/// command handler.
#[derive(Debug, Clone)]
pub struct Config {
    pub namespace: String,
    /// The submitting user's identity: the ownership label on submitted
    /// jobs and the list filter.
    pub login_user: String,
    pub default_image: String,
}

impl Config {
    /// Reads `~/.kuai/config.toml` if present, then overlays the
    /// environment: `KUAI_NAMESPACE`, `KUAI_USER`, falling back to `USER`.
    pub fn load() -> Result<Config, KuaiError> {
        let file = read_config_file()?;
        let namespace = std::env::var("KUAI_NAMESPACE")
            .ok()
            .or(file.namespace)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let login_user = std::env::var("KUAI_USER")
            .ok()
            .or(file.user)
            .or_else(|| std::env::var("USER").ok())
            .ok_or_else(|| {
                KuaiError::Validation(
                    "unable to determine the submitting user, set KUAI_USER".to_string(),
                )
            })?;
        let default_image = file
            .default_image
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string());
        Ok(Config {
            namespace,
            login_user,
            default_image,
        })
    }
}

fn read_config_file() -> Result<ConfigFile, KuaiError> {
    let path = expand_tilde(CONFIG_PATH);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let contents = fs::read_to_string(&path).map_err(|e| {
        KuaiError::Validation(format!("failed to read {}: {e}", path.display()))
    })?;
    toml::from_str(&contents).map_err(|e| {
        KuaiError::Validation(format!("failed to parse {}: {e}", path.display()))
    })
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
