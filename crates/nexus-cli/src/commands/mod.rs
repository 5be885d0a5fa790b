//! Slash commands for the interactive client

mod attach;

pub use attach::resolve_path;

use std::path::PathBuf;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Show a message to the user (nothing is sent)
    Message(String),
    /// Create and select a new conversation
    NewChat,
    /// Refetch the conversation list
    Refresh,
    /// Clear the selection and go back to the home page
    Home,
    /// Attach a file to the draft
    Attach(PathBuf),
    /// Drop all attached files
    Detach,
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next().unwrap_or("").to_lowercase();
    let args = parts.next().map(str::trim).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "new" | "n" => CommandResult::NewChat,

        "refresh" | "r" => CommandResult::Refresh,

        "home" => CommandResult::Home,

        "attach" | "a" => {
            if args.is_empty() {
                CommandResult::Message("Usage: /attach <path>".to_string())
            } else {
                CommandResult::Attach(resolve_path(args))
            }
        }

        "detach" => CommandResult::Detach,

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

pub fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /new, /n             Start a new conversation
  /refresh, /r         Reload the conversation list
  /home                Back to the home page
  /attach, /a <path>   Attach a file to the next message
  /detach              Remove attached files
  /quit, /exit, /q     Exit nexus

Keys:
  Enter                Send message / open conversation
  Shift+Enter, Ctrl+J  New line
  Tab                  Switch between sidebar and composer
  Ctrl+N               New conversation
  Ctrl+R               Reload conversation list
  PgUp/PgDn            Scroll history
  Ctrl+C, Ctrl+Q       Quit"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_command() {
        assert_eq!(execute_command("hello"), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(execute_command("/n"), Some(CommandResult::NewChat));
        assert_eq!(execute_command("  /REFRESH "), Some(CommandResult::Refresh));
        assert_eq!(execute_command("/q"), Some(CommandResult::Exit));
        assert_eq!(execute_command("/home"), Some(CommandResult::Home));
    }

    #[test]
    fn test_attach_needs_path() {
        assert!(matches!(
            execute_command("/attach"),
            Some(CommandResult::Message(m)) if m.starts_with("Usage")
        ));
        assert_eq!(
            execute_command("/attach  notes.txt"),
            Some(CommandResult::Attach(PathBuf::from("notes.txt")))
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            execute_command("/frobnicate now"),
            Some(CommandResult::Unknown("frobnicate".into()))
        );
    }
}
