//! Server-generated numeric replies (spec.md §4.3/§4.4/§4.5, §6).
//!
//! Every outgoing numeric has the shape pinned by spec.md §4.5:
//! `:<source> <numeric> <target-nick> <rest>\r\n`, where `<source>` is
//! always the configured server name for these (they are never relayed
//! traffic). `<target-nick>` is the receiving client's current nick, or
//! `"*"` before a nick has been assigned (RFC 2812 convention, used for
//! pre-registration errors like 431).

use crate::constants::*;

pub const UNREGISTERED_TARGET: &str = "*";

fn line(server: &str, code: u16, target: &str, rest: &str) -> String {
    format!(":{server} {code:03} {target} {rest}\r\n")
}

pub fn welcome(server: &str, nick: &str) -> String {
    line(server, RPL_WELCOME, nick, &format!(":Welcome to {server}"))
}

pub fn your_host(server: &str, nick: &str, version: &str) -> String {
    line(
        server,
        RPL_YOURHOST,
        nick,
        &format!(":Your host is {server}, running version {version}"),
    )
}

pub fn created(server: &str, nick: &str, created_at: &str) -> String {
    line(
        server,
        RPL_CREATED,
        nick,
        &format!(":This server was created {created_at}"),
    )
}

pub fn my_info(server: &str, nick: &str, version: &str) -> String {
    line(server, RPL_MYINFO, nick, &format!("{server} {version} o t"))
}

pub fn luser_client(server: &str, nick: &str, user_count: usize) -> String {
    line(
        server,
        RPL_LUSERCLIENT,
        nick,
        &format!(":There are {user_count} users and 0 invisible on 0 servers"),
    )
}

pub fn luser_me(server: &str, nick: &str, user_count: usize) -> String {
    line(
        server,
        RPL_LUSERME,
        nick,
        &format!(":I have {user_count} clients and 0 servers"),
    )
}

pub fn motd_start(server: &str, nick: &str) -> String {
    line(
        server,
        RPL_MOTDSTART,
        nick,
        &format!(":- {server} Message of the day - "),
    )
}

pub fn motd_line(server: &str, nick: &str, text: &str) -> String {
    line(server, RPL_MOTD, nick, &format!(":- {text}"))
}

pub fn end_of_motd(server: &str, nick: &str) -> String {
    line(server, RPL_ENDOFMOTD, nick, ":End of /MOTD command.")
}

pub fn no_topic(server: &str, nick: &str, channel: &str) -> String {
    line(server, RPL_NOTOPIC, nick, &format!("{channel} :No topic is set"))
}

pub fn topic(server: &str, nick: &str, channel: &str, topic_text: &str) -> String {
    line(server, RPL_TOPIC, nick, &format!("{channel} :{topic_text}"))
}

pub fn names_reply(server: &str, nick: &str, channel: &str, names: &str) -> String {
    line(server, RPL_NAMREPLY, nick, &format!("={channel} :{names}"))
}

pub fn end_of_names(server: &str, nick: &str, channel: &str) -> String {
    line(
        server,
        RPL_ENDOFNAMES,
        nick,
        &format!("{channel} :End of /NAMES list"),
    )
}

pub fn no_such_nick(server: &str, nick: &str, target: &str) -> String {
    line(
        server,
        ERR_NOSUCHNICK,
        nick,
        &format!("{target} :{ERR_NOSUCHNICK_STR}"),
    )
}

pub fn no_such_server(server: &str, nick: &str, queried_server: &str) -> String {
    line(
        server,
        ERR_NOSUCHSERVER,
        nick,
        &format!("{queried_server} :{ERR_NOSUCHSERVER_STR}"),
    )
}

pub fn no_such_channel(server: &str, nick: &str, channel: &str) -> String {
    line(
        server,
        ERR_NOSUCHCHANNEL,
        nick,
        &format!("{channel} :{ERR_NOSUCHCHANNEL_STR}"),
    )
}

pub fn no_nickname_given(server: &str) -> String {
    line(
        server,
        ERR_NONICKNAMEGIVEN,
        UNREGISTERED_TARGET,
        &format!(":{ERR_NONICKNAMEGIVEN_STR}"),
    )
}

/// `attempted_nick` is the rejected nick, not the (unchanged) session nick:
/// see DESIGN.md's discussion of spec.md §8 scenario 2.
pub fn nickname_in_use(server: &str, attempted_nick: &str) -> String {
    line(
        server,
        ERR_NICKNAMEINUSE,
        attempted_nick,
        &format!(":{ERR_NICKNAMEINUSE_STR}"),
    )
}

pub fn not_on_channel(server: &str, nick: &str, channel: &str) -> String {
    line(
        server,
        ERR_NOTONCHANNEL,
        nick,
        &format!("{channel} :{ERR_NOTONCHANNEL_STR}"),
    )
}

/// PRIVMSG's ERR_NOTONCHANNEL variant: spec.md §4.4 calls for "the error
/// variant without own nick prefix on the error line"; the channel takes
/// the numeric's target slot directly instead of the sender's nick.
pub fn not_on_channel_terse(server: &str, channel: &str) -> String {
    line(
        server,
        ERR_NOTONCHANNEL,
        channel,
        &format!(":{ERR_NOTONCHANNEL_STR}"),
    )
}

pub fn need_more_params(server: &str, target: &str, command: &str) -> String {
    line(
        server,
        ERR_NEEDMOREPARAMS,
        target,
        &format!("{command} :{ERR_NEEDMOREPARAMS_STR}"),
    )
}

pub fn already_registered(server: &str, nick: &str) -> String {
    line(
        server,
        ERR_ALREADYREGISTERED,
        nick,
        &format!(":{ERR_ALREADYREGISTERED_STR}"),
    )
}

pub fn bad_chan_mask(server: &str, nick: &str, channel: &str) -> String {
    line(server, ERR_BADCHANMASK, nick, &format!("{channel} :{ERR_BADCHANMASK_STR}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_matches_pinned_scenario() {
        assert_eq!(
            welcome("pyircd", "alice"),
            ":pyircd 001 alice :Welcome to pyircd\r\n"
        );
    }

    #[test]
    fn nickname_in_use_matches_pinned_scenario_numeric() {
        assert_eq!(
            nickname_in_use("pyircd", "alice"),
            ":pyircd 432 alice :Nickname is already in use\r\n"
        );
    }

    #[test]
    fn names_reply_matches_pinned_scenario() {
        assert_eq!(
            names_reply("pyircd", "alice", "#room", "alice"),
            ":pyircd 353 alice =#room :alice\r\n"
        );
    }

    #[test]
    fn end_of_names_matches_pinned_scenario() {
        assert_eq!(
            end_of_names("pyircd", "alice", "#room"),
            ":pyircd 366 alice :End of /NAMES list\r\n"
        );
    }
}
