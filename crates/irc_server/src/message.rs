//! Message Parser (spec.md §4.2).
//!
//! Turns one frame (raw bytes including the trailing CRLF) into a
//! [`ParsedMessage`], or rejects it. The algorithm below follows spec.md
//! §4.2 step by step; see DESIGN.md for why this is hand-rolled rather than
//! built on a grammar-combinator crate.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Payload length spec.md §4.2 step 3 truncates to (512 minus CRLF).
pub const MAX_PAYLOAD_CHARS: usize = 510;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub command: String,
    pub parameters: Vec<String>,
}

impl ParsedMessage {
    pub fn param(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }
}

/// The RFC 2812 alpha commands this parser recognizes (spec.md §4.2 step 7).
/// Recognition here is independent from dispatch: a recognized-but-not-
/// implemented command (e.g. `WHOIS`) parses fine and is silently ignored
/// by [`crate::client::ClientSession::dispatch`] (spec.md §4.4).
static RECOGNIZED_COMMANDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "CAP", "PASS", "NICK", "USER", "OPER", "MODE", "SERVICE", "QUIT", "SQUIT", "JOIN",
        "PART", "TOPIC", "NAMES", "LIST", "INVITE", "KICK", "PRIVMSG", "NOTICE", "MOTD",
        "LUSERS", "VERSION", "STATS", "LINKS", "TIME", "CONNECT", "TRACE", "ADMIN", "INFO",
        "SERVLIST", "SQUERY", "WHO", "WHOIS", "WHOWAS", "KILL", "PING", "PONG", "ERROR", "AWAY",
        "REHASH", "DIE", "RESTART", "SUMMON", "USERS", "WALLOPS", "USERHOST", "ISON",
    ]
    .into_iter()
    .collect()
});

fn is_forbidden_parameter(param: &str) -> bool {
    param.bytes().any(|b| b == 0) || param.contains('\r') || param.contains('\n') || param.contains("::")
}

/// Parses one CRLF-terminated frame. Returns `None` on any of the
/// rejection conditions in spec.md §4.2 (the caller silently drops the
/// frame and keeps the connection open, per spec.md §7).
pub fn parse_frame(frame: &[u8]) -> Option<ParsedMessage> {
    let text = std::str::from_utf8(frame).ok()?;
    let text = text.strip_suffix("\r\n").unwrap_or(text);
    let text = text.trim_start_matches(' ');

    let text: std::borrow::Cow<str> = if text.chars().count() > MAX_PAYLOAD_CHARS {
        std::borrow::Cow::Owned(text.chars().take(MAX_PAYLOAD_CHARS).collect())
    } else {
        std::borrow::Cow::Borrowed(text)
    };

    let (head, trailing) = match text.find(':') {
        Some(idx) => (text[..idx].trim_end(), Some(text[idx + 1..].to_string())),
        None => (text.as_ref(), None),
    };

    let mut tokens = head.split(' ').filter(|token| !token.is_empty());
    let command = tokens.next()?.to_ascii_uppercase();
    let mut parameters: Vec<String> = tokens.map(str::to_string).collect();
    if let Some(trailing) = trailing {
        parameters.push(trailing);
    }

    if !RECOGNIZED_COMMANDS.contains(command.as_str()) {
        return None;
    }
    if parameters.iter().any(|p| is_forbidden_parameter(p)) {
        return None;
    }

    Some(ParsedMessage { command, parameters })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nick_with_single_param() {
        let msg = parse_frame(b"NICK alice\r\n").unwrap();
        assert_eq!(msg.command, "NICK");
        assert_eq!(msg.parameters, vec!["alice"]);
    }

    #[test]
    fn parses_user_with_trailing_param() {
        let msg = parse_frame(b"USER alice 0 * :Alice A\r\n").unwrap();
        assert_eq!(msg.command, "USER");
        assert_eq!(msg.parameters, vec!["alice", "0", "*", "Alice A"]);
    }

    #[test]
    fn uppercases_command() {
        let msg = parse_frame(b"ping token\r\n").unwrap();
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(parse_frame(b"NICK \xff\xfe\r\n").is_none());
    }

    #[test]
    fn rejects_unrecognized_command() {
        assert!(parse_frame(b"FROBNICATE #room\r\n").is_none());
    }

    #[test]
    fn rejects_double_colon_sequence() {
        assert!(parse_frame(b"PRIVMSG #room ::oops\r\n").is_none());
    }

    #[test]
    fn rejects_embedded_nul() {
        assert!(parse_frame(b"PRIVMSG #room :hi\x00there\r\n").is_none());
    }

    #[test]
    fn truncates_overlong_line_before_parsing() {
        let overlong = format!("PRIVMSG #room :{}\r\n", "x".repeat(520));
        let msg = parse_frame(overlong.as_bytes()).unwrap();
        let trailing = msg.parameters.last().unwrap();
        // "PRIVMSG #room :" is 15 chars, leaving 510 - 15 = 495 'x's.
        assert_eq!(trailing.len(), 495);
    }

    #[test]
    fn left_trims_leading_spaces() {
        let msg = parse_frame(b"   PING token\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.parameters, vec!["token"]);
    }

    #[test]
    fn drops_empty_middle_tokens_from_extra_spaces() {
        let msg = parse_frame(b"JOIN   #room\r\n").unwrap();
        assert_eq!(msg.parameters, vec!["#room"]);
    }

    #[test]
    fn trailing_param_preserves_internal_spaces() {
        let msg = parse_frame(b"PRIVMSG #room :hello there friend\r\n").unwrap();
        assert_eq!(msg.parameters, vec!["#room", "hello there friend"]);
    }
}
