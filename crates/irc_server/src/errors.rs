//! Startup-time error types.
//!
//! Protocol-level problems never reach here: per spec.md §7 they are
//! converted into numeric replies or silently dropped frames inside the
//! dispatch path, never propagated as `Result` errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read MOTD file {path}: {source}")]
    ReadMotd {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("could not bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
