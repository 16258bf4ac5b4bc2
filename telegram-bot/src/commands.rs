/// A slash command sent as a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Daily,
    Stop,
    Cancel,
    Premium,
    /// Admin-only manual upgrade; carries the raw argument.
    Grant(String),
    Unknown(String),
}

impl Command {
    /// `None` when the text is not a command. Accepts the `/name@botname`
    /// form Telegram uses in group chats.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "daily" => Command::Daily,
            "stop" => Command::Stop,
            "cancel" => Command::Cancel,
            "premium" => Command::Premium,
            "grant" => Command::Grant(args.to_string()),
            _ => Command::Unknown(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /HELP  "), Some(Command::Help));
        assert_eq!(Command::parse("/daily@UORJOB_bot"), Some(Command::Daily));
        assert_eq!(Command::parse("/stop"), Some(Command::Stop));
        assert_eq!(Command::parse("/cancel"), Some(Command::Cancel));
        assert_eq!(Command::parse("/premium"), Some(Command::Premium));
        assert_eq!(
            Command::parse("/grant 12345"),
            Some(Command::Grant("12345".to_string()))
        );
        assert_eq!(
            Command::parse("/frobnicate now"),
            Some(Command::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("python jobs in pune"), None);
        assert_eq!(Command::parse("and/or"), None);
    }
}
