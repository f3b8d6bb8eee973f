//! Channel routing strings.
//!
//! A routing string lists one or more destinations separated by `,` or `;`.
//! Each token is one of:
//!
//! - `channel`
//! - `@dmchannel`
//! - `user@channel`
//! - `user@@dmchannel`

use std::fmt;

/// Username used when a token does not name one.
pub const DEFAULT_USERNAME: &str = "jenkins";

/// Label shown in logs for the webhook's own default channel.
pub const DEFAULT_ROOM_LABEL: &str = "(default)";

/// One `(username, room)` pair a message is posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Name the message is posted as
    pub username: String,
    /// Target channel; empty means the webhook's default channel
    pub room: String,
}

impl Destination {
    /// Parse a single routing token.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.find('@') {
            Some(at) if at > 0 && at < token.len() - 1 => Self {
                username: token[..at].trim().to_string(),
                room: token[at + 1..].trim().to_string(),
            },
            _ => Self {
                username: DEFAULT_USERNAME.to_string(),
                room: token.to_string(),
            },
        }
    }

    /// Room to put in the payload, `None` for the default channel.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        if self.room.is_empty() {
            None
        } else {
            Some(&self.room)
        }
    }

    /// Room name for log output.
    #[must_use]
    pub fn label(&self) -> &str {
        self.channel().unwrap_or(DEFAULT_ROOM_LABEL)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.label())
    }
}

/// Split a routing string into destinations, in order.
///
/// Runs of separators count as one. Blank tokens are kept and route to the
/// default channel; trailing empty tokens are dropped.
#[must_use]
pub fn parse_channel_spec(routing: &str) -> Vec<Destination> {
    split_tokens(routing).into_iter().map(Destination::parse).collect()
}

fn split_tokens(routing: &str) -> Vec<&str> {
    let is_separator = |c: char| c == ',' || c == ';';

    if !routing.contains(is_separator) {
        return vec![routing];
    }

    let mut tokens: Vec<&str> = routing
        .split(is_separator)
        .enumerate()
        .filter(|(i, token)| *i == 0 || !token.is_empty())
        .map(|(_, token)| token)
        .collect();

    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(username: &str, room: &str) -> Destination {
        Destination {
            username: username.to_string(),
            room: room.to_string(),
        }
    }

    #[test]
    fn test_user_and_room() {
        assert_eq!(Destination::parse("alice@town-square"), dest("alice", "town-square"));
        assert_eq!(Destination::parse(" alice @ town-square "), dest("alice", "town-square"));
    }

    #[test]
    fn test_room_only() {
        assert_eq!(Destination::parse("town-square"), dest("jenkins", "town-square"));
    }

    #[test]
    fn test_leading_at_is_direct_message_room() {
        assert_eq!(Destination::parse("@dm-channel"), dest("jenkins", "@dm-channel"));
    }

    #[test]
    fn test_trailing_at_is_part_of_room() {
        assert_eq!(Destination::parse("alice@"), dest("jenkins", "alice@"));
    }

    #[test]
    fn test_token_trimmed_before_splitting() {
        assert_eq!(Destination::parse(" @dm"), dest("jenkins", "@dm"));
        assert_eq!(Destination::parse("alice@ "), dest("jenkins", "alice@"));
        assert_eq!(
            parse_channel_spec("a@b; @oncall"),
            vec![dest("a", "b"), dest("jenkins", "@oncall")]
        );
    }

    #[test]
    fn test_user_with_direct_message_room() {
        assert_eq!(Destination::parse("alice@@bob"), dest("alice", "@bob"));
    }

    #[test]
    fn test_empty_room_label() {
        let d = Destination::parse("");
        assert_eq!(d, dest("jenkins", ""));
        assert_eq!(d.channel(), None);
        assert_eq!(d.label(), "(default)");
        assert_eq!(d.to_string(), "jenkins@(default)");
    }

    #[test]
    fn test_multiple_destinations_keep_order() {
        let parsed = parse_channel_spec("a@b,c@d;general");
        assert_eq!(
            parsed,
            vec![dest("a", "b"), dest("c", "d"), dest("jenkins", "general")]
        );
    }

    #[test]
    fn test_repeated_separators_collapse() {
        let parsed = parse_channel_spec("one,,;;two");
        assert_eq!(parsed, vec![dest("jenkins", "one"), dest("jenkins", "two")]);
    }

    #[test]
    fn test_blank_tokens_are_not_filtered() {
        let parsed = parse_channel_spec("one, ,two");
        assert_eq!(
            parsed,
            vec![dest("jenkins", "one"), dest("jenkins", ""), dest("jenkins", "two")]
        );

        let parsed = parse_channel_spec(",one");
        assert_eq!(parsed, vec![dest("jenkins", ""), dest("jenkins", "one")]);
    }

    #[test]
    fn test_trailing_separator_dropped() {
        assert_eq!(parse_channel_spec("one;"), vec![dest("jenkins", "one")]);
        assert!(parse_channel_spec(",;").is_empty());
    }

    #[test]
    fn test_empty_routing_string_is_default_channel() {
        assert_eq!(parse_channel_spec(""), vec![dest("jenkins", "")]);
    }
}
