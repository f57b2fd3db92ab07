//! Per-connection task (spec.md §4.1): multiplexes socket readiness
//! against the connection's own outbound queue inside one `tokio::select!`,
//! so a single task owns the connection end to end and no cross-task
//! coordination is needed to close it cleanly.
//!
//! Grounded on the teacher's `bin/irc_server.rs` read loop (`socket.read`
//! into a fixed buffer, spawned per accepted connection), extended with
//! the write side `examples/original_source/src/daemon/server.py`'s
//! selector loop keeps separate (`in_buffer`/`out_buffer` drained on
//! readiness) but which a single-task `select!` expresses more directly
//! in async Rust.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::client::ClientSession;
use crate::framer;
use crate::message::parse_frame;
use crate::server::Shared;

const READ_CHUNK_SIZE: usize = 4096;

pub async fn handle_connection(mut socket: TcpStream, peer: SocketAddr, shared: Arc<Shared>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let mut session = ClientSession::new(peer, tx, &shared.clients);
    let mut in_buf: Vec<u8> = Vec::new();
    let mut read_buf = [0u8; READ_CHUNK_SIZE];

    loop {
        tokio::select! {
            result = socket.read(&mut read_buf) => {
                match result {
                    Ok(0) => {
                        info!("connection closed by peer: {peer}");
                        session.handle_disconnect(&shared);
                        break;
                    }
                    Ok(n) => {
                        in_buf.extend_from_slice(&read_buf[..n]);
                        for frame in framer::extract_frames(&mut in_buf) {
                            if let Some(msg) = parse_frame(&frame) {
                                session.dispatch(msg, &shared);
                            }
                        }
                        if session.is_quitting() {
                            drain_and_close(&mut socket, &mut rx).await;
                            break;
                        }
                    }
                    Err(err) => {
                        error!("read error from {peer}: {err}");
                        session.handle_disconnect(&shared);
                        break;
                    }
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(bytes) => {
                        if let Err(err) = socket.write_all(&bytes).await {
                            error!("write error to {peer}: {err}");
                            session.handle_disconnect(&shared);
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }
}

/// QUIT has already queued its ERROR line; flush whatever is left in the
/// channel (there may be none) before closing, per spec.md §4.1's
/// "Shutdown trigger".
async fn drain_and_close(socket: &mut TcpStream, rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) {
    rx.close();
    while let Some(bytes) = rx.recv().await {
        let _ = socket.write_all(&bytes).await;
    }
    let _ = socket.shutdown().await;
}
