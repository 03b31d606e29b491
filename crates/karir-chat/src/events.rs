//! Widget event types

use karir_ai::Message;
use serde::{Deserialize, Serialize};

/// Events emitted by the widget controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetEvent {
    /// Chat panel opened
    Opened,

    /// Chat panel closed
    Closed,

    /// A message was appended to the conversation
    MessageAppended { message: Message },

    /// Request outstanding: typing indicator shown, send disabled
    TypingStarted,

    /// Request finished: typing indicator hidden, send enabled
    TypingStopped,

    /// Conversation cleared, widget back to its welcome state
    Reset,
}
