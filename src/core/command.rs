//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation
    Chain(String),
    Select(String),
    Sort(String),
    Refresh,
    Enrich,
    Unlabeled,

    // Label form; an empty value clears the field
    Owner(String),
    Category(String),
    Name(String),
    Submit,

    // Analysis
    Verify,
    Sources,
    Lookup,
    Open(Option<String>),
    Copy,

    Export(Option<String>),
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        "chain" | "ch" => match args {
            Some(chain) => Command::Chain(chain),
            None => Command::Unknown(input.to_string()),
        },
        "select" | "sel" | "addr" | "address" => match args {
            Some(addr) => Command::Select(addr),
            None => Command::Unknown(input.to_string()),
        },
        "sort" => match args {
            Some(key) => Command::Sort(key),
            None => Command::Unknown(input.to_string()),
        },
        "refresh" | "reload" | "r" => Command::Refresh,
        "enrich" => Command::Enrich,
        "unlabeled" | "filter" => Command::Unlabeled,

        "owner" | "project" => Command::Owner(args.unwrap_or_default()),
        "category" | "cat" => Command::Category(args.unwrap_or_default()),
        "name" => Command::Name(args.unwrap_or_default()),
        "submit" | "save" | "w" => Command::Submit,

        "verify" | "sourcify" => Command::Verify,
        "sources" | "files" | "src" => Command::Sources,
        "lookup" | "explorer" | "bs" => Command::Lookup,
        "open" | "link" => Command::Open(args),
        "copy" | "yank" | "y" => Command::Copy,

        "export" | "exp" => Command::Export(args),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(parse_command("chain base"), Command::Chain("base".to_string()));
        assert_eq!(parse_command("ch 10"), Command::Chain("10".to_string()));
        assert_eq!(
            parse_command("select 0x1234"),
            Command::Select("0x1234".to_string())
        );
        assert_eq!(parse_command("sort gas"), Command::Sort("gas".to_string()));
        assert_eq!(parse_command("reload"), Command::Refresh);
        assert_eq!(parse_command("filter"), Command::Unlabeled);
    }

    #[test]
    fn test_parse_label_commands() {
        assert_eq!(
            parse_command("owner  uniswap v3 "),
            Command::Owner("uniswap v3".to_string())
        );
        assert_eq!(parse_command("cat"), Command::Category(String::new()));
        assert_eq!(parse_command("name Router"), Command::Name("Router".to_string()));
        assert_eq!(parse_command("w"), Command::Submit);
    }

    #[test]
    fn test_parse_analysis_commands() {
        assert_eq!(parse_command("sourcify"), Command::Verify);
        assert_eq!(parse_command("files"), Command::Sources);
        assert_eq!(parse_command("explorer"), Command::Lookup);
        assert_eq!(parse_command("open"), Command::Open(None));
        assert_eq!(
            parse_command("open dedaub"),
            Command::Open(Some("dedaub".to_string()))
        );
        assert_eq!(
            parse_command("export json"),
            Command::Export(Some("json".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
        assert_eq!(parse_command("chain"), Command::Unknown("chain".to_string()));
    }
}
