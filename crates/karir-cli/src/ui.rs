//! Console presentation for the chat widget

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use karir_ai::{Message, Sender};
use karir_chat::{ChatWidget, WidgetEvent, locale};
use tokio::sync::{
    Notify,
    broadcast::{self, error::RecvError},
};

/// Render a message with its sender prefix
pub fn format_message(message: &Message) -> String {
    let label = match message.sender {
        Sender::User => "Anda",
        Sender::Bot => "AI",
    };
    format!("{}: {}", label, message.text)
}

/// Print the header, then the stored conversation or the welcome text
pub fn print_intro(widget: &ChatWidget) {
    println!("{}", locale::TITLE);
    println!();

    if widget.is_cold_start() {
        println!("{}", widget.welcome_message());
    } else {
        for message in widget.messages() {
            println!("{}", format_message(message));
            println!();
        }
    }
    println!();
    println!("{} (/help for commands)", locale::PLACEHOLDER);
}

/// Draws the typing indicator from widget events
pub struct EventRenderer<W: Write> {
    out: W,
    /// Erase the indicator in place instead of ending its line
    erase: bool,
    typing: bool,
}

impl<W: Write> EventRenderer<W> {
    pub fn new(out: W, erase: bool) -> Self {
        Self {
            out,
            erase,
            typing: false,
        }
    }

    /// Render one event; returns true when a request has finished
    pub fn render(&mut self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::TypingStarted => {
                let _ = write!(self.out, "{}...", locale::TYPING);
                let _ = self.out.flush();
                self.typing = true;
                false
            }
            WidgetEvent::TypingStopped => {
                if self.typing {
                    if self.erase {
                        let _ = write!(self.out, "\r\x1b[2K");
                    } else {
                        let _ = writeln!(self.out);
                    }
                    let _ = self.out.flush();
                    self.typing = false;
                }
                true
            }
            event => {
                tracing::debug!(?event, "Widget event");
                false
            }
        }
    }
}

/// Feed events to `renderer` until the widget goes away.
///
/// `turn_done` is notified after each finished request, once the indicator
/// has been erased. A lagged receiver also notifies, since the stop event
/// may be among the skipped ones.
pub async fn render_events<W: Write>(
    mut receiver: broadcast::Receiver<WidgetEvent>,
    mut renderer: EventRenderer<W>,
    turn_done: Arc<Notify>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if renderer.render(&event) {
                    turn_done.notify_one();
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Widget events dropped");
                turn_done.notify_one();
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Render to stderr, erasing the indicator when stderr is a terminal
pub fn stderr_renderer() -> EventRenderer<io::Stderr> {
    let stderr = io::stderr();
    let erase = stderr.is_terminal();
    EventRenderer::new(stderr, erase)
}
