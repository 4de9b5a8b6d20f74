use std::io::ErrorKind;
use std::path::Path;
use std::{env, fs};

use serde::Deserialize;

/// Top-level configuration, loaded from a YAML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port the listener binds on.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 42069 }
    }
}

impl Config {
    /// Load configuration from the file named by `ANVIL_CONFIG`, falling
    /// back to `anvil.yaml` in the working directory. A missing file is not
    /// an error; defaults apply. A present but malformed file is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var("ANVIL_CONFIG").unwrap_or_else(|_| "anvil.yaml".to_string());
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_yaml(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
