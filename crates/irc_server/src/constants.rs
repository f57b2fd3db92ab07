//! Numeric reply codes implemented by this server.
//!
//! Codes and default text follow RFC 2812 §5 except where noted; see
//! `DESIGN.md` for the 432-vs-433 nick-collision decision.

pub const RPL_WELCOME: u16 = 001;
pub const RPL_YOURHOST: u16 = 002;
pub const RPL_CREATED: u16 = 003;
pub const RPL_MYINFO: u16 = 004;

pub const RPL_LUSERCLIENT: u16 = 251;
pub const RPL_LUSERME: u16 = 255;

pub const RPL_NOTOPIC: u16 = 331;
pub const RPL_TOPIC: u16 = 332;
pub const RPL_NAMREPLY: u16 = 353;
pub const RPL_ENDOFNAMES: u16 = 366;

pub const RPL_MOTD: u16 = 372;
pub const RPL_MOTDSTART: u16 = 375;
pub const RPL_ENDOFMOTD: u16 = 376;

pub const ERR_NOSUCHNICK: u16 = 401;
pub const ERR_NOSUCHNICK_STR: &str = "No such nick/channel";

pub const ERR_NOSUCHSERVER: u16 = 402;
pub const ERR_NOSUCHSERVER_STR: &str = "No such server";

pub const ERR_NOSUCHCHANNEL: u16 = 403;
pub const ERR_NOSUCHCHANNEL_STR: &str = "No such channel";

pub const ERR_UNKNOWNCOMMAND: u16 = 421;
pub const ERR_UNKNOWNCOMMAND_STR: &str = "Unknown command";

pub const ERR_NONICKNAMEGIVEN: u16 = 431;
pub const ERR_NONICKNAMEGIVEN_STR: &str = "No nickname given";

/// See DESIGN.md: spec.md §6 lists 432 (not 433) as the implemented
/// nick-collision numeric and the worked example in §8 sends 432.
pub const ERR_NICKNAMEINUSE: u16 = 432;
pub const ERR_NICKNAMEINUSE_STR: &str = "Nickname is already in use";

pub const ERR_NOTONCHANNEL: u16 = 442;
pub const ERR_NOTONCHANNEL_STR: &str = "You're not on that channel";

/// Defined for completeness (spec.md §6 names it) but currently
/// unreachable: it is the standard reply to INVITE-ing a user already on
/// the target channel, and INVITE is not in spec.md §4.4's dispatch table.
#[allow(dead_code)]
pub const ERR_USERONCHANNEL: u16 = 443;
#[allow(dead_code)]
pub const ERR_USERONCHANNEL_STR: &str = "is already on channel";

pub const ERR_NEEDMOREPARAMS: u16 = 461;
pub const ERR_NEEDMOREPARAMS_STR: &str = "Not enough parameters";

pub const ERR_ALREADYREGISTERED: u16 = 462;
pub const ERR_ALREADYREGISTERED_STR: &str = "You may not reregister";

pub const ERR_BADCHANMASK: u16 = 476;
pub const ERR_BADCHANMASK_STR: &str = "Bad Channel Mask";
