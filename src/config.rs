use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_DATA_PATH: &str = "data/plans.json";
const DEFAULT_PREFS_PATH: &str = "data/preferences.json";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_path = lookup("DAYPLAN_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

        Self {
            port,
            data_path: PathBuf::from(data_path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub preferences_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("DAYPLAN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let preferences_path =
            lookup("DAYPLAN_PREFS_PATH").unwrap_or_else(|| DEFAULT_PREFS_PATH.to_string());

        Self {
            api_url,
            preferences_path: PathBuf::from(preferences_path),
        }
    }
}
