//! Configuration loading (spec.md §6: "Configuration & environment").
//!
//! `SERVER_NAME` and the MOTD text are process-global in spec.md's model;
//! here they live in one `Config` value built once at startup and shared
//! via `Arc` with every reply formatter and connection task, per spec.md
//! §9's note to "pass them as explicit context ... rather than rely on
//! ambient globals".

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;

const DEFAULT_SERVER_NAME: &str = "pyircd";
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 6667;
const DEFAULT_MOTD: &str = "Welcome to pyircd.";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub motd: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            motd: DEFAULT_MOTD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub network: NetworkConfig,
}

impl Config {
    /// Loads and parses a TOML configuration file. Any field the file omits
    /// keeps its built-in default.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_ref.display().to_string(),
            source,
        })
    }

    /// Reads MOTD text from an external file (spec.md §6: "MOTD content is
    /// supplied externally as a multi-line string"), overwriting whatever
    /// `server.motd` held.
    pub fn load_motd_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_ref = path.as_ref();
        self.server.motd = fs::read_to_string(path_ref).map_err(|source| ConfigError::ReadMotd {
            path: path_ref.display().to_string(),
            source,
        })?;
        Ok(())
    }

    pub fn motd_lines(&self) -> Vec<&str> {
        self.server.motd.lines().collect()
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.network.bind_address, self.network.port)
    }
}
