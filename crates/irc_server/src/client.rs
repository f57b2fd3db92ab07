//! Client Session and Client Registry (spec.md §3, §4.3, §4.4, §4.6).
//!
//! Grounded on the teacher's `user_state.rs` (`UserState` with a
//! `tx_outbound: mpsc::UnboundedSender<...>` output handle) and on
//! `examples/original_source/src/daemon/client.py`'s registration
//! handshake and dispatch-by-command-name shape. `ClientHandle` is the
//! slice of session state other connections' tasks need to reach
//! (current nick, registration flag, output handle); everything else
//! lives only in `ClientSession`, owned by the one task driving this
//! connection.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::channel::{Channel, OutputHandle};
use crate::message::ParsedMessage;
use crate::replies;
use crate::server::Shared;

/// The part of a session visible to other connections' tasks: enough to
/// address a PRIVMSG to this client by nick, to check registration state
/// during NICK collision detection, and to hand out as a channel member's
/// `output` handle.
pub struct ClientHandle {
    pub peer: SocketAddr,
    nick: RwLock<String>,
    registered: RwLock<bool>,
    output: OutputHandle,
}

impl ClientHandle {
    pub fn nick(&self) -> String {
        self.nick.read().unwrap().clone()
    }

    fn set_nick(&self, nick: String) {
        *self.nick.write().unwrap() = nick;
    }

    pub fn is_registered(&self) -> bool {
        *self.registered.read().unwrap()
    }

    fn set_registered(&self, value: bool) {
        *self.registered.write().unwrap() = value;
    }

    pub fn output(&self) -> OutputHandle {
        self.output.clone()
    }

    pub fn send(&self, line: String) {
        let _ = self.output.send(line.into_bytes());
    }
}

/// Process-wide mapping peer address → [`ClientHandle`] (spec.md §3
/// "Client Registry"), with a linear scan-by-nick derived view used both
/// for PRIVMSG-to-user delivery and NICK collision detection (spec.md
/// §4.6).
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<SocketAddr, Arc<ClientHandle>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        ClientRegistry::default()
    }

    fn insert(&self, handle: Arc<ClientHandle>) {
        self.clients.insert(handle.peer, handle);
    }

    pub fn remove(&self, peer: &SocketAddr) {
        self.clients.remove(peer);
    }

    pub fn registered_count(&self) -> usize {
        self.clients.iter().filter(|e| e.value().is_registered()).count()
    }

    /// Exact-case comparison, per spec.md §9's noted RFC deviation.
    pub fn nick_in_use(&self, nick: &str) -> bool {
        self.clients
            .iter()
            .any(|e| e.value().is_registered() && e.value().nick() == nick)
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<Arc<ClientHandle>> {
        self.clients
            .iter()
            .find(|e| e.value().is_registered() && e.value().nick() == nick)
            .map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }
}

fn is_valid_channel_name(name: &str) -> bool {
    name.starts_with('#') && !name.contains(' ') && !name.contains(',') && !name.bytes().any(|b| b == 0x07)
}

/// Per-connection state machine (spec.md §3 "ClientSession"). Owned
/// exclusively by the task driving one TCP connection; never shared.
pub struct ClientSession {
    peer: SocketAddr,
    handle: Arc<ClientHandle>,
    username: String,
    // Stored per the USER command's data model (spec.md §3) but not read by
    // any operation this implementation dispatches.
    #[allow(dead_code)]
    realname: String,
    channels: HashMap<String, Arc<Channel>>,
    quitting: bool,
}

impl ClientSession {
    pub fn new(peer: SocketAddr, output: OutputHandle, registry: &ClientRegistry) -> Self {
        let handle = Arc::new(ClientHandle {
            peer,
            nick: RwLock::new(String::new()),
            registered: RwLock::new(false),
            output,
        });
        registry.insert(handle.clone());
        ClientSession {
            peer,
            handle,
            username: String::new(),
            realname: String::new(),
            channels: HashMap::new(),
            quitting: false,
        }
    }

    /// Set once QUIT has written its ERROR line; the connection task
    /// drains remaining output and then closes (spec.md §4.1 "Shutdown
    /// trigger").
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn nick(&self) -> String {
        self.handle.nick()
    }

    pub fn dispatch(&mut self, msg: ParsedMessage, shared: &Shared) {
        if !self.handle.is_registered() {
            match msg.command.as_str() {
                "NICK" => self.cmd_nick(&msg, shared),
                "USER" => self.cmd_user(&msg, shared),
                _ => {}
            }
            return;
        }

        match msg.command.as_str() {
            "NICK" => {}
            "USER" => self.handle.send(replies::already_registered(
                &shared.config.server.name,
                &self.nick(),
            )),
            "PING" => self.cmd_ping(&msg, shared),
            "QUIT" => self.cmd_quit(&msg, shared),
            "JOIN" => self.cmd_join(&msg, shared),
            "PART" => self.cmd_part(&msg, shared),
            "PRIVMSG" => self.cmd_privmsg(&msg, shared),
            "LUSERS" => self.cmd_lusers(shared),
            "MOTD" => self.cmd_motd(&msg, shared),
            _ => {}
        }
    }

    /// Cleanup for a connection that disappeared without sending QUIT
    /// (EOF or socket error): spec.md §4.1/§7 treat this as a synthetic
    /// DISCONNECT with reason "Disconnected", no ERROR line, no self-echo.
    pub fn handle_disconnect(&mut self, shared: &Shared) {
        self.leave_all_channels(shared, "Disconnected");
        shared.clients.remove(&self.peer);
    }

    fn cmd_nick(&mut self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        let nick = match msg.param(0) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                self.handle.send(replies::no_nickname_given(server));
                return;
            }
        };
        if shared.clients.nick_in_use(&nick) {
            self.handle.send(replies::nickname_in_use(server, &nick));
            return;
        }
        self.handle.set_nick(nick);
        self.maybe_complete_registration(shared);
    }

    fn cmd_user(&mut self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        if self.handle.is_registered() {
            self.handle.send(replies::already_registered(server, &self.nick()));
            return;
        }
        if msg.parameters.len() < 4 {
            self.handle
                .send(replies::need_more_params(server, replies::UNREGISTERED_TARGET, "USER"));
            return;
        }
        let username = msg.param(0).unwrap();
        let realname = msg.param(3).unwrap();
        if username.is_empty() || realname.is_empty() {
            self.handle
                .send(replies::need_more_params(server, replies::UNREGISTERED_TARGET, "USER"));
            return;
        }
        self.username = username.to_string();
        self.realname = realname.to_string();
        self.maybe_complete_registration(shared);
    }

    fn maybe_complete_registration(&mut self, shared: &Shared) {
        let nick = self.handle.nick();
        if nick.is_empty() || self.username.is_empty() {
            return;
        }
        // NICK and USER can land in either order across two frames, so
        // another peer may have registered with this nick in between this
        // session's NICK and its USER. Recheck here, right before the
        // registered flag actually flips, to close that window.
        if shared.clients.nick_in_use(&nick) {
            self.handle.send(replies::nickname_in_use(&shared.config.server.name, &nick));
            return;
        }
        self.handle.set_registered(true);

        let server = &shared.config.server.name;
        let version = &shared.config.server.version;
        self.handle.send(replies::welcome(server, &nick));
        self.handle.send(replies::your_host(server, &nick, version));
        self.handle.send(replies::created(server, &nick, &shared.created_at));
        self.handle.send(replies::my_info(server, &nick, version));
        self.send_motd(shared);
    }

    fn send_motd(&self, shared: &Shared) {
        let server = &shared.config.server.name;
        let nick = self.handle.nick();
        self.handle.send(replies::motd_start(server, &nick));
        for line in shared.config.motd_lines() {
            self.handle.send(replies::motd_line(server, &nick, line));
        }
        self.handle.send(replies::end_of_motd(server, &nick));
    }

    fn cmd_ping(&self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        match msg.param(0) {
            Some(token) => self.handle.send(format!(":{server} PONG {server} {token}\r\n")),
            None => self
                .handle
                .send(replies::need_more_params(server, &self.nick(), "PING")),
        }
    }

    fn cmd_quit(&mut self, msg: &ParsedMessage, shared: &Shared) {
        let reason = msg.param(0).unwrap_or("");
        self.handle.send(format!("ERROR :QUIT: {reason}\r\n"));
        self.leave_all_channels(shared, "Disconnected");
        shared.clients.remove(&self.peer);
        self.quitting = true;
    }

    fn leave_all_channels(&mut self, shared: &Shared, reason: &str) {
        let nick = self.handle.nick();
        for (_, channel) in self.channels.drain() {
            channel.unregister(&self.peer);
            channel.broadcast_except(
                self.peer,
                &format!(":{nick} PART {} :{reason}\r\n", channel.name()),
            );
            shared.channels.remove_if_empty(channel.name());
        }
    }

    fn cmd_join(&mut self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        let Some(list) = msg.param(0) else {
            self.handle
                .send(replies::need_more_params(server, &self.nick(), "JOIN"));
            return;
        };
        let list = list.to_string();
        for name in list.split(',').filter(|s| !s.is_empty()) {
            self.join_one(name, shared);
        }
    }

    fn join_one(&mut self, name: &str, shared: &Shared) {
        let server = &shared.config.server.name;
        let nick = self.handle.nick();

        if !is_valid_channel_name(name) {
            self.handle.send(replies::bad_chan_mask(server, &nick, name));
            return;
        }
        let key = name.to_lowercase();
        if self.channels.contains_key(&key) {
            return;
        }

        let channel = shared.channels.get_or_create(name);
        if !channel.register(self.peer, nick.clone(), self.handle.output()) {
            return;
        }
        self.channels.insert(key, channel.clone());

        let join_line = format!(":{nick} JOIN {}\r\n", channel.name());
        channel.broadcast_except(self.peer, &join_line);
        self.handle.send(join_line);

        let topic = channel.topic();
        if !topic.is_empty() {
            self.handle.send(replies::topic(server, &nick, channel.name(), &topic));
        }
        let names = channel.member_nicks().join(",");
        self.handle.send(replies::names_reply(server, &nick, channel.name(), &names));
        self.handle.send(replies::end_of_names(server, &nick, channel.name()));
    }

    /// spec.md §4.4: "parameters past the **last** '#'-prefixed one are
    /// joined with spaces and used as the reason". Channels aren't
    /// necessarily confined to the first parameter (e.g. `PART #a #b`), so
    /// the channel/reason boundary has to be found by scanning all
    /// parameters rather than assuming it sits after parameter 0.
    fn cmd_part(&mut self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        let Some(last_channel_idx) = msg.parameters.iter().rposition(|p| p.starts_with('#')) else {
            self.handle
                .send(replies::need_more_params(server, &self.nick(), "PART"));
            return;
        };
        let channel_names: Vec<String> = msg.parameters[..=last_channel_idx]
            .iter()
            .flat_map(|p| p.split(','))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let reason = msg.parameters[last_channel_idx + 1..].join(" ");
        for name in channel_names {
            self.part_one(&name, &reason, shared);
        }
    }

    fn part_one(&mut self, name: &str, reason: &str, shared: &Shared) {
        let server = &shared.config.server.name;
        let nick = self.handle.nick();
        let key = name.to_lowercase();

        let Some(channel) = shared.channels.get(name) else {
            self.handle.send(replies::no_such_channel(server, &nick, name));
            return;
        };
        if !self.channels.contains_key(&key) {
            self.handle.send(replies::not_on_channel(server, &nick, name));
            return;
        }

        let part_line = format!(":{nick} PART {} :{reason}\r\n", channel.name());
        channel.broadcast_except(self.peer, &part_line);
        self.handle.send(part_line);
        channel.unregister(&self.peer);
        self.channels.remove(&key);
        shared.channels.remove_if_empty(channel.name());
    }

    fn cmd_privmsg(&mut self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        let nick = self.handle.nick();

        if msg.parameters.len() < 2 {
            self.handle
                .send(replies::need_more_params(server, &nick, "PRIVMSG"));
            return;
        }
        let targets = msg.param(0).unwrap().to_string();
        let text = msg.parameters.last().unwrap().clone();

        for target in targets.split(',').filter(|s| !s.is_empty()) {
            if target.starts_with('#') {
                match shared.channels.get(target) {
                    None => self.handle.send(replies::no_such_channel(server, &nick, target)),
                    Some(channel) => {
                        if !channel.is_member(&self.peer) {
                            self.handle.send(replies::not_on_channel_terse(server, target));
                            continue;
                        }
                        let line = format!(":{nick} PRIVMSG {} :{text}\r\n", channel.name());
                        channel.broadcast_except(self.peer, &line);
                    }
                }
            } else {
                match shared.clients.find_by_nick(target) {
                    None => self.handle.send(replies::no_such_nick(server, &nick, target)),
                    Some(recipient) => {
                        recipient.send(format!(":{nick} PRIVMSG {target} :{text}\r\n"));
                    }
                }
            }
        }
    }

    fn cmd_lusers(&self, shared: &Shared) {
        let server = &shared.config.server.name;
        let nick = self.nick();
        let count = shared.clients.registered_count();
        self.handle.send(replies::luser_client(server, &nick, count));
        self.handle.send(replies::luser_me(server, &nick, count));
    }

    fn cmd_motd(&self, msg: &ParsedMessage, shared: &Shared) {
        let server = &shared.config.server.name;
        if let Some(queried) = msg.param(0) {
            if queried != server {
                self.handle
                    .send(replies::no_such_server(server, &self.nick(), queried));
                return;
            }
        }
        self.send_motd(shared);
    }
}
