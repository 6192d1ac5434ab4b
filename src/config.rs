use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_USERNAME: &str = "friend";
const DEFAULT_NETWORK_RETRIES: u32 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub backend_url: String,
    pub username: String,
    pub network_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            network_retries: DEFAULT_NETWORK_RETRIES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Missing or unparseable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let backend_url = lookup("WELLNESS_BACKEND_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.backend_url);
        let username = lookup("WELLNESS_USERNAME")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.username);
        let network_retries = lookup("WELLNESS_NETWORK_RETRIES")
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(defaults.network_retries);

        Self {
            port,
            data_path,
            backend_url,
            username,
            network_retries,
        }
    }
}
