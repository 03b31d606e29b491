//! /history command - print the conversation

use super::CommandResult;
use karir_chat::ChatWidget;

pub struct HistoryCommand;

impl HistoryCommand {
    pub fn execute(widget: &ChatWidget) -> CommandResult {
        if widget.is_cold_start() {
            return CommandResult::Message(widget.welcome_message().to_string());
        }

        let lines: Vec<String> = widget
            .messages()
            .iter()
            .map(crate::ui::format_message)
            .collect();
        CommandResult::Message(lines.join("\n\n"))
    }
}
