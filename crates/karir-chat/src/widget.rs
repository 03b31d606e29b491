//! Chat widget controller

use std::sync::Arc;

use karir_ai::{CompletionClient, Message};
use tokio::sync::broadcast;

use crate::{conversation::Conversation, events::WidgetEvent, history::ChatHistory, locale};

/// Fixed texts shown by the widget
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Shown instead of history on a cold start
    pub welcome_message: String,
    /// Appended as a bot message when a completion fails
    pub error_message: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            welcome_message: locale::WELCOME.to_string(),
            error_message: locale::ERROR_REPLY.to_string(),
        }
    }
}

/// Result of [`ChatWidget::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Whitespace-only input; nothing happened
    Ignored,
    /// The assistant replied with this message
    Replied(Message),
    /// The request failed; this error message was appended instead
    Failed(Message),
}

impl SendOutcome {
    /// The bot message appended by this send, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            SendOutcome::Ignored => None,
            SendOutcome::Replied(m) | SendOutcome::Failed(m) => Some(m),
        }
    }
}

#[derive(Debug)]
struct Indicator {
    typing: bool,
    send_enabled: bool,
}

/// Shows the typing indicator and disables sending until dropped.
struct BusyGuard<'a> {
    indicator: &'a mut Indicator,
    event_tx: &'a broadcast::Sender<WidgetEvent>,
}

impl<'a> BusyGuard<'a> {
    fn enter(indicator: &'a mut Indicator, event_tx: &'a broadcast::Sender<WidgetEvent>) -> Self {
        indicator.typing = true;
        indicator.send_enabled = false;
        let _ = event_tx.send(WidgetEvent::TypingStarted);
        Self {
            indicator,
            event_tx,
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.typing = false;
        self.indicator.send_enabled = true;
        let _ = self.event_tx.send(WidgetEvent::TypingStopped);
    }
}

/// The chat widget: open/closed state, the conversation, and one
/// completion request per user turn.
pub struct ChatWidget {
    config: WidgetConfig,
    conversation: Conversation,
    history: ChatHistory,
    client: Arc<dyn CompletionClient>,
    is_open: bool,
    indicator: Indicator,
    event_tx: broadcast::Sender<WidgetEvent>,
}

impl ChatWidget {
    /// Create a widget, loading any stored conversation
    pub fn new(
        history: ChatHistory,
        client: Arc<dyn CompletionClient>,
        config: WidgetConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let conversation = Conversation::new(history.load());
        tracing::debug!(messages = conversation.len(), "Chat widget initialized");

        Self {
            config,
            conversation,
            history,
            client,
            is_open: false,
            indicator: Indicator {
                typing: false,
                send_enabled: true,
            },
            event_tx,
        }
    }

    /// Subscribe to widget events
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.event_tx.subscribe()
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the typing indicator is shown
    pub fn is_typing(&self) -> bool {
        self.indicator.typing
    }

    /// Whether the send control is enabled
    pub fn can_send(&self) -> bool {
        self.indicator.send_enabled
    }

    /// True when there is no history and the welcome text is shown
    pub fn is_cold_start(&self) -> bool {
        self.conversation.is_empty()
    }

    pub fn welcome_message(&self) -> &str {
        &self.config.welcome_message
    }

    pub fn open(&mut self) {
        self.is_open = true;
        let _ = self.event_tx.send(WidgetEvent::Opened);
    }

    /// Close the panel and persist the conversation
    pub fn close(&mut self) {
        self.is_open = false;
        let _ = self.event_tx.send(WidgetEvent::Closed);
        self.history.save(self.conversation.messages());
    }

    /// Flip the open state; returns the new state
    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        let event = if self.is_open {
            WidgetEvent::Opened
        } else {
            WidgetEvent::Closed
        };
        let _ = self.event_tx.send(event);
        self.is_open
    }

    /// Persist before the host goes away
    pub fn unload(&mut self) {
        self.history.save(self.conversation.messages());
    }

    /// Clear stored and in-memory history and return to the welcome state
    pub fn reset(&mut self) {
        self.history.clear();
        self.is_open = false;
        self.conversation = Conversation::new(self.history.load());
        let _ = self.event_tx.send(WidgetEvent::Reset);
        tracing::info!("Chat history reset");
    }

    /// Send a user message and wait for the reply.
    ///
    /// Whitespace-only input is ignored. Failures never escape: they are
    /// logged and replaced by the configured error message. The typing
    /// indicator is hidden and sending re-enabled on every exit path,
    /// including when this future is dropped before completion.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let user_message = Message::user(text);
        self.conversation.push(user_message.clone());
        let _ = self.event_tx.send(WidgetEvent::MessageAppended {
            message: user_message,
        });

        let _busy = BusyGuard::enter(&mut self.indicator, &self.event_tx);

        let outcome = match self.client.complete(self.conversation.prior(), text).await {
            Ok(reply) => SendOutcome::Replied(Message::bot(reply)),
            Err(e) => {
                tracing::error!(status = ?e.status_code(), "Completion failed: {}", e);
                if e.is_auth_failure() {
                    tracing::warn!("Endpoint rejected the credential; check the API key or proxy");
                }
                SendOutcome::Failed(Message::bot(self.config.error_message.clone()))
            }
        };

        if let Some(message) = outcome.message() {
            self.conversation.push(message.clone());
            let _ = self.event_tx.send(WidgetEvent::MessageAppended {
                message: message.clone(),
            });
        }
        self.history.save(self.conversation.messages());

        outcome
    }
}
