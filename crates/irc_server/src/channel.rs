//! Channel and Channel Registry (spec.md §3, §4.5).
//!
//! Grounded on the teacher's `channels_models.rs` `IrcChannel` (per-channel
//! `DashSet`/`DashMap` membership, no process-wide lock) and on
//! `examples/original_source/src/daemon/channel.py`'s `register` /
//! `unregister` / `get_broadcast` trio, the direct ancestor of the
//! closures-as-capabilities design spec.md §9 describes.

use std::net::SocketAddr;
use std::sync::RwLock;

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;

/// The "append to output buffer" capability spec.md §9 calls out: every
/// member handle carries it, and a channel hands it out again disguised as
/// `broadcast`. Sending never blocks (`UnboundedSender::send` is
/// synchronous), which is what lets `ClientSession::dispatch` stay
/// synchronous end to end.
pub type OutputHandle = UnboundedSender<Vec<u8>>;

struct Member {
    nick: String,
    output: OutputHandle,
}

/// A named broadcast group (spec.md §3 "Channel").
pub struct Channel {
    name: String,
    topic: RwLock<String>,
    members: DashMap<SocketAddr, Member>,
}

impl Channel {
    fn new(name: String) -> Self {
        Channel {
            name,
            topic: RwLock::new(String::new()),
            members: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> String {
        self.topic.read().unwrap().clone()
    }

    pub fn set_topic(&self, topic: String) {
        *self.topic.write().unwrap() = topic;
    }

    pub fn is_member(&self, peer: &SocketAddr) -> bool {
        self.members.contains_key(peer)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Registers `peer` as a member. Returns `false` if `peer` was already
    /// a member (spec.md §4.5: "If `peer` is already present, returns
    /// nothing"; the higher layer, `ClientSession::cmd_join`, treats a
    /// `false` return as the no-op case spec.md §4.4 pins for a repeat
    /// JOIN).
    pub fn register(&self, peer: SocketAddr, nick: String, output: OutputHandle) -> bool {
        if self.members.contains_key(&peer) {
            return false;
        }
        self.members.insert(peer, Member { nick, output });
        true
    }

    pub fn unregister(&self, peer: &SocketAddr) {
        self.members.remove(peer);
    }

    /// Delivers `line` to every current member except `exclude`.
    pub fn broadcast_except(&self, exclude: SocketAddr, line: &str) {
        for entry in self.members.iter() {
            if *entry.key() != exclude {
                let _ = entry.value().output.send(line.as_bytes().to_vec());
            }
        }
    }

    pub fn member_nicks(&self) -> Vec<String> {
        self.members.iter().map(|e| e.value().nick.clone()).collect()
    }

    pub fn member_addresses(&self) -> Vec<SocketAddr> {
        self.members.iter().map(|e| *e.key()).collect()
    }
}

/// Process-wide mapping from case-folded channel name to [`Channel`]
/// (spec.md §3 "Channel Registry"). Case folding only affects lookup keys;
/// `Channel::name` preserves the case the channel was created with
/// (spec.md §9 "Case folding").
#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, std::sync::Arc<Channel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        ChannelRegistry::default()
    }

    pub fn get(&self, name: &str) -> Option<std::sync::Arc<Channel>> {
        self.channels.get(&name.to_lowercase()).map(|e| e.value().clone())
    }

    /// Returns the channel named `name`, creating it (with `name`'s case
    /// preserved) if it doesn't exist yet.
    pub fn get_or_create(&self, name: &str) -> std::sync::Arc<Channel> {
        self.channels
            .entry(name.to_lowercase())
            .or_insert_with(|| std::sync::Arc::new(Channel::new(name.to_string())))
            .clone()
    }

    /// Removes the channel named `name` if (and only if) it has no members
    /// left, matching spec.md §3's invariant "a channel is never empty and
    /// alive".
    pub fn remove_if_empty(&self, name: &str) {
        self.channels
            .remove_if(&name.to_lowercase(), |_, channel| channel.is_empty());
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn register_is_idempotent_for_same_peer() {
        let channel = Channel::new("#room".to_string());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(channel.register(addr(1), "alice".to_string(), tx.clone()));
        assert!(!channel.register(addr(1), "alice".to_string(), tx));
    }

    #[test]
    fn broadcast_excludes_originator() {
        let channel = Channel::new("#room".to_string());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        channel.register(addr(1), "alice".to_string(), tx1);
        channel.register(addr(2), "bob".to_string(), tx2);

        channel.broadcast_except(addr(1), ":alice PRIVMSG #room :hi\r\n");

        assert!(rx1.try_recv().is_err());
        assert_eq!(
            rx2.try_recv().unwrap(),
            b":alice PRIVMSG #room :hi\r\n".to_vec()
        );
    }

    #[test]
    fn registry_creates_lazily_and_preserves_case() {
        let registry = ChannelRegistry::new();
        assert!(registry.get("#Room").is_none());
        let channel = registry.get_or_create("#Room");
        assert_eq!(channel.name(), "#Room");
        assert_eq!(registry.get("#room").unwrap().name(), "#Room");
    }

    #[test]
    fn registry_removes_only_when_empty() {
        let registry = ChannelRegistry::new();
        let channel = registry.get_or_create("#room");
        let (tx, _rx) = mpsc::unbounded_channel();
        channel.register(addr(1), "alice".to_string(), tx);

        registry.remove_if_empty("#room");
        assert!(registry.get("#room").is_some());

        channel.unregister(&addr(1));
        registry.remove_if_empty("#room");
        assert!(registry.get("#room").is_none());
    }
}
