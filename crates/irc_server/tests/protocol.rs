//! End-to-end protocol tests driving a real TCP connection against an
//! in-process server bound to an ephemeral port, covering spec.md §8's
//! pinned scenarios. Grounded on the teacher's own `bin/irc_client_tests.rs`
//! approach of exercising the daemon over a real socket rather than calling
//! internal handlers directly.

use std::time::Duration;

use irc_server::config::Config;
use irc_server::server::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Spins up a server on an OS-assigned port and returns its address.
async fn spawn_server() -> String {
    let mut config = Config::default();
    config.network.bind_address = "127.0.0.1".to_string();
    config.network.port = 0;

    let listener = TcpListener::bind((config.network.bind_address.as_str(), 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    config.network.port = addr.port();
    drop(listener);

    let server = Server::new(config);
    let bound_addr = addr.to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to bind before clients connect.
    tokio::time::sleep(Duration::from_millis(50)).await;
    bound_addr
}

async fn connect(addr: &str) -> TcpStream {
    TcpStream::connect(addr).await.unwrap()
}

async fn send(stream: &mut TcpStream, line: &str) {
    stream.write_all(line.as_bytes()).await.unwrap();
}

/// Reads until at least `min_lines` complete CRLF-terminated lines have
/// arrived, then returns all lines read so far.
async fn read_lines(stream: &mut TcpStream, min_lines: usize) -> Vec<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let text = String::from_utf8_lossy(&buf);
        let lines: Vec<String> = text
            .split("\r\n")
            .filter(|s| !s.is_empty())
            .map(|s| format!("{s}\r\n"))
            .collect();
        if lines.len() >= min_lines {
            return lines;
        }
        let n = timeout(Duration::from_secs(2), stream.read(&mut chunk))
            .await
            .expect("timed out waiting for server output")
            .unwrap();
        assert!(n > 0, "connection closed before enough lines arrived");
        buf.extend_from_slice(&chunk[..n]);
    }
}

async fn register(stream: &mut TcpStream, nick: &str) -> Vec<String> {
    send(stream, &format!("NICK {nick}\r\n")).await;
    send(stream, &format!("USER {nick} 0 * :{nick} Realname\r\n")).await;
    read_lines(stream, 8).await
}

#[tokio::test]
async fn registration_burst_matches_pinned_scenario() {
    let addr = spawn_server().await;
    let mut c1 = connect(&addr).await;

    let lines = register(&mut c1, "alice").await;
    assert_eq!(lines[0], ":pyircd 001 alice :Welcome to pyircd\r\n");
    assert!(lines[1].starts_with(":pyircd 002 alice"));
    assert!(lines[2].starts_with(":pyircd 003 alice"));
    assert!(lines[3].starts_with(":pyircd 004 alice"));
    assert!(lines[4].starts_with(":pyircd 375 alice"));
    assert!(lines.iter().any(|l| l.starts_with(":pyircd 376 alice")));
}

#[tokio::test]
async fn nick_collision_replies_with_432() {
    let addr = spawn_server().await;
    let mut c1 = connect(&addr).await;
    register(&mut c1, "alice").await;

    let mut c2 = connect(&addr).await;
    send(&mut c2, "NICK alice\r\n").await;
    let lines = read_lines(&mut c2, 1).await;
    assert_eq!(lines[0], ":pyircd 432 alice :Nickname is already in use\r\n");
}

#[tokio::test]
async fn join_broadcast_and_names_ordering() {
    let addr = spawn_server().await;
    let mut c1 = connect(&addr).await;
    register(&mut c1, "alice").await;

    send(&mut c1, "JOIN #room\r\n").await;
    let lines = read_lines(&mut c1, 3).await;
    assert_eq!(lines[0], ":alice JOIN #room\r\n");
    assert_eq!(lines[1], ":pyircd 353 alice =#room :alice\r\n");
    assert_eq!(lines[2], ":pyircd 366 alice :End of /NAMES list\r\n");

    let mut c2 = connect(&addr).await;
    register(&mut c2, "bob").await;
    send(&mut c2, "JOIN #room\r\n").await;

    let c1_lines = read_lines(&mut c1, 1).await;
    assert_eq!(c1_lines[0], ":bob JOIN #room\r\n");

    let c2_lines = read_lines(&mut c2, 2).await;
    assert_eq!(c2_lines[0], ":bob JOIN #room\r\n");
    assert!(c2_lines[1].contains("alice") && c2_lines[1].contains("bob"));
}

#[tokio::test]
async fn privmsg_to_channel_and_to_user_and_unknown_nick() {
    let addr = spawn_server().await;
    let mut c1 = connect(&addr).await;
    register(&mut c1, "alice").await;
    send(&mut c1, "JOIN #room\r\n").await;
    read_lines(&mut c1, 3).await;

    let mut c2 = connect(&addr).await;
    register(&mut c2, "bob").await;
    send(&mut c2, "JOIN #room\r\n").await;
    read_lines(&mut c2, 2).await;
    read_lines(&mut c1, 1).await; // bob's JOIN echoed to alice

    send(&mut c1, "PRIVMSG #room :hello\r\n").await;
    let lines = read_lines(&mut c2, 1).await;
    assert_eq!(lines[0], ":alice PRIVMSG #room :hello\r\n");

    send(&mut c1, "PRIVMSG bob :hey there!\r\n").await;
    let lines = read_lines(&mut c2, 1).await;
    assert_eq!(lines[0], ":alice PRIVMSG bob :hey there!\r\n");

    send(&mut c1, "PRIVMSG ghost :hi\r\n").await;
    let lines = read_lines(&mut c1, 1).await;
    assert!(lines[0].contains(" 401 "));
}

#[tokio::test]
async fn quit_cleans_up_channel_and_closes_connection() {
    let addr = spawn_server().await;
    let mut c1 = connect(&addr).await;
    register(&mut c1, "alice").await;
    send(&mut c1, "JOIN #room\r\n").await;
    read_lines(&mut c1, 3).await;

    let mut c2 = connect(&addr).await;
    register(&mut c2, "bob").await;
    send(&mut c2, "JOIN #room\r\n").await;
    read_lines(&mut c2, 2).await;
    read_lines(&mut c1, 1).await;

    send(&mut c1, "QUIT :bye\r\n").await;
    let lines = read_lines(&mut c1, 1).await;
    assert_eq!(lines[0], "ERROR :QUIT: bye\r\n");

    let lines = read_lines(&mut c2, 1).await;
    assert_eq!(lines[0], ":alice PART #room :Disconnected\r\n");

    let mut chunk = [0u8; 16];
    let n = timeout(Duration::from_secs(2), c1.read(&mut chunk))
        .await
        .expect("timed out waiting for connection close");
    assert_eq!(n.unwrap(), 0, "connection should be closed after QUIT");
}
