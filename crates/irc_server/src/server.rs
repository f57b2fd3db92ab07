//! Top-level server: owns the shared registries/config and runs the
//! accept loop (spec.md §4.1 "Accept").
//!
//! Grounded on the teacher's `bin/irc_server.rs` accept loop (`TcpListener`
//! + `tokio::spawn` per connection) generalized to dispatch into the
//! rebuilt protocol core instead of the teacher's `handle_request`.

use std::sync::Arc;
use std::time::SystemTime;

use log::{error, info};
use tokio::net::TcpListener;

use crate::channel::ChannelRegistry;
use crate::client::ClientRegistry;
use crate::config::Config;
use crate::connection;
use crate::errors::ServerError;

/// Process-wide state every connection task needs: configuration plus the
/// two registries. Passed as explicit context rather than read from
/// globals, per spec.md §9 "Global registries".
pub struct Shared {
    pub config: Arc<Config>,
    pub clients: ClientRegistry,
    pub channels: ChannelRegistry,
    pub created_at: String,
}

pub struct Server {
    shared: Arc<Shared>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Server {
            shared: Arc::new(Shared {
                config: Arc::new(config),
                clients: ClientRegistry::new(),
                channels: ChannelRegistry::new(),
                created_at: format!("{:?}", SystemTime::now()),
            }),
        }
    }

    /// Binds the listening socket and runs the accept loop until a bind
    /// error or an unrecoverable listener error occurs. A per-connection
    /// panic is isolated inside its own `tokio::spawn`'d task and never
    /// reaches here (spec.md §7 "log and continue").
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.shared.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
        info!("{} listening on {addr}", self.shared.config.server.name);

        loop {
            let (socket, peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(err) => {
                    error!("accept failed: {err}");
                    continue;
                }
            };
            info!("accepted connection from {peer}");
            let shared = self.shared.clone();
            tokio::spawn(async move {
                connection::handle_connection(socket, peer, shared).await;
            });
        }
    }
}
