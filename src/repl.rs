//! Line parsing for the interactive prompt.
//!
//! Backslash-prefixed lines are commands; everything else is a question
//! for the chat surface.

use std::path::PathBuf;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Free-text question routed through the interpreter.
    Question(String),
    /// `\connect <string-or-name>` or bare `\connect`.
    Connect(Option<String>),
    /// `\import [path [table]]`.
    Import {
        path: Option<PathBuf>,
        table: Option<String>,
    },
    /// `\history`
    History,
    /// `\help`
    Help,
    /// `\quit` / `\q`
    Quit,
    /// Backslash command nobody recognizes.
    Unknown(String),
    /// Blank line.
    Empty,
}

/// Parses a raw input line.
pub fn parse_input(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }

    let Some(command) = line.strip_prefix('\\') else {
        return ReplInput::Question(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    match name {
        "connect" => ReplInput::Connect(parts.next().map(str::to_string)),
        "import" => ReplInput::Import {
            path: parts.next().map(PathBuf::from),
            table: parts.next().map(str::to_string),
        },
        "history" => ReplInput::History,
        "help" => ReplInput::Help,
        "quit" | "q" => ReplInput::Quit,
        other => ReplInput::Unknown(other.to_string()),
    }
}

/// Help text for the prompt.
pub fn help_text() -> &'static str {
    "Ask questions in plain text, e.g.:\n\
     \x20 how many rows in table 'customers'\n\
     \x20 what tables exist?\n\
     Commands:\n\
     \x20 \\connect <conn-string|name>  connect to a database\n\
     \x20 \\import [path [table]]       preview a CSV file and append its rows\n\
     \x20 \\history                     show the conversation so far\n\
     \x20 \\help                        show this help\n\
     \x20 \\quit                        exit"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question() {
        assert_eq!(
            parse_input("how many rows in table 'orders'"),
            ReplInput::Question("how many rows in table 'orders'".to_string())
        );
    }

    #[test]
    fn test_parse_question_is_trimmed() {
        assert_eq!(
            parse_input("  what tables  \n"),
            ReplInput::Question("what tables".to_string())
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_input(""), ReplInput::Empty);
        assert_eq!(parse_input("   \n"), ReplInput::Empty);
    }

    #[test]
    fn test_parse_connect() {
        assert_eq!(parse_input("\\connect"), ReplInput::Connect(None));
        assert_eq!(
            parse_input("\\connect postgres://u:p@h:5432/db"),
            ReplInput::Connect(Some("postgres://u:p@h:5432/db".to_string()))
        );
        assert_eq!(
            parse_input("\\connect prod"),
            ReplInput::Connect(Some("prod".to_string()))
        );
    }

    #[test]
    fn test_parse_import() {
        assert_eq!(
            parse_input("\\import"),
            ReplInput::Import {
                path: None,
                table: None
            }
        );
        assert_eq!(
            parse_input("\\import data.csv"),
            ReplInput::Import {
                path: Some(PathBuf::from("data.csv")),
                table: None
            }
        );
        assert_eq!(
            parse_input("\\import data.csv people"),
            ReplInput::Import {
                path: Some(PathBuf::from("data.csv")),
                table: Some("people".to_string())
            }
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_input("\\history"), ReplInput::History);
        assert_eq!(parse_input("\\help"), ReplInput::Help);
        assert_eq!(parse_input("\\quit"), ReplInput::Quit);
        assert_eq!(parse_input("\\q"), ReplInput::Quit);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_input("\\frobnicate now"),
            ReplInput::Unknown("frobnicate".to_string())
        );
    }
}
