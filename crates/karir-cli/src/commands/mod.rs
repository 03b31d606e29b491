//! Slash commands for interactive mode

mod history;

pub use history::HistoryCommand;

use karir_chat::ChatWidget;

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Show a message to the user (not sent to the assistant)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, widget: &mut ChatWidget) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let command = rest.split_whitespace().next().unwrap_or("").to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "open" | "o" => {
            widget.open();
            CommandResult::Message("Chat opened.".to_string())
        }

        "close" => {
            widget.close();
            CommandResult::Message("Chat closed. Type /open to continue.".to_string())
        }

        "toggle" | "t" => {
            let state = if widget.toggle() { "opened" } else { "closed" };
            CommandResult::Message(format!("Chat {}.", state))
        }

        "reset" | "r" => {
            widget.reset();
            CommandResult::Message(format!(
                "Conversation cleared.\n\n{}",
                widget.welcome_message()
            ))
        }

        "history" => HistoryCommand::execute(widget),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /open, /o            Open the chat
  /close               Close the chat (saves the conversation)
  /toggle, /t          Open or close the chat
  /history             Show the conversation so far
  /reset, /r           Delete the saved conversation and start over
  /quit, /exit, /q     Save and exit karir

Anything else is sent to the assistant."#
        .to_string()
}
