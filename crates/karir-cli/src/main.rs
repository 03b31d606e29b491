//! karir - KarirKita career assistant in the terminal

mod commands;
mod config;
mod ui;

use clap::Parser;
use std::sync::Arc;
use tokio::{sync::Notify, task::JoinHandle};

use karir_ai::{DEFAULT_ENDPOINT, providers::openrouter::OpenRouterClient};
use karir_chat::{
    ChatHistory, ChatWidget, FileStore, SendOutcome, WidgetConfig, history::DEFAULT_KEY,
};
use tracing_subscriber::EnvFilter;

/// karir - AI career assistant
#[derive(Parser, Debug)]
#[command(name = "karir")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: deepseek/deepseek-r1-0528-qwen3-8b:free)
    #[arg(short, long)]
    model: Option<String>,

    /// Chat-completions endpoint or proxy URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Conversation storage file
    #[arg(short, long)]
    storage: Option<String>,

    /// Send a single question and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Delete the saved conversation before starting
    #[arg(long)]
    reset: bool,

    /// Do not send the career-assistant persona
    #[arg(long)]
    no_persona: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the conversation
    let filter = if args.verbose {
        EnvFilter::new("karir=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Merge config with CLI args (CLI takes precedence)
    let mut cfg = config::Config::load();
    if let Some(model) = args.model {
        cfg.model = Some(model);
    }
    if let Some(endpoint) = args.endpoint {
        cfg.endpoint = Some(endpoint);
    }
    if let Some(storage) = args.storage {
        cfg.storage_path = Some(storage);
    }
    if args.no_persona {
        cfg.persona = Some(false);
    }

    let mut client = OpenRouterClient::new(cfg.completion_options()?)
        .with_endpoint(cfg.endpoint())
        .with_api_key(cfg.api_key())
        .with_title(cfg.title());
    if let Some(ref referer) = cfg.referer {
        client = client.with_referer(referer);
    }

    if !client.has_api_key() && client.endpoint() == DEFAULT_ENDPOINT {
        eprintln!("Warning: No API key found for {}", client.endpoint());
        eprintln!("  Set it with: export {}=your-key", cfg.api_key_env());
        eprintln!("  Or point `endpoint` at a proxy that adds it: karir --init-config");
        eprintln!();
    }

    tracing::debug!(
        endpoint = client.endpoint(),
        model = %client.options().model,
        "Using completion client"
    );

    let store = match cfg.storage_path() {
        Some(path) => FileStore::new(path),
        None => FileStore::open_default(),
    };
    tracing::debug!(path = %store.path().display(), "Using conversation storage");

    let history = ChatHistory::with_key(
        Arc::new(store),
        cfg.storage_key.as_deref().unwrap_or(DEFAULT_KEY),
    );
    let mut widget = ChatWidget::new(history, Arc::new(client), WidgetConfig::default());

    if args.reset {
        widget.reset();
    }

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&mut widget, &command).await;
    }

    run_interactive(&mut widget).await
}

async fn run_command(widget: &mut ChatWidget, command: &str) -> anyhow::Result<()> {
    let (events, turn_done) = spawn_event_renderer(widget);

    widget.open();
    let outcome = send_and_wait(widget, command, &turn_done).await;
    widget.unload();
    events.abort();

    match outcome {
        SendOutcome::Ignored => {
            eprintln!("Nothing to send.");
            std::process::exit(2);
        }
        SendOutcome::Replied(message) => {
            println!("{}", message.text);
            Ok(())
        }
        SendOutcome::Failed(message) => {
            eprintln!("{}", message.text);
            std::process::exit(1);
        }
    }
}

async fn run_interactive(widget: &mut ChatWidget) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (events, turn_done) = spawn_event_renderer(widget);

    widget.open();
    ui::print_intro(widget);

    loop {
        println!();
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = commands::execute_command(input, widget) {
            match result {
                commands::CommandResult::Message(msg) => {
                    println!("{}", msg);
                }
                commands::CommandResult::Exit => {
                    break;
                }
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        if !widget.is_open() {
            println!("Chat is closed. Type /open to continue.");
            continue;
        }

        match send_and_wait(widget, input, &turn_done).await {
            SendOutcome::Replied(message) | SendOutcome::Failed(message) => {
                println!("{}", ui::format_message(&message));
            }
            SendOutcome::Ignored => {}
        }
    }

    widget.unload();
    events.abort();
    Ok(())
}

fn spawn_event_renderer(widget: &ChatWidget) -> (JoinHandle<()>, Arc<Notify>) {
    let turn_done = Arc::new(Notify::new());
    let handle = tokio::spawn(ui::render_events(
        widget.subscribe(),
        ui::stderr_renderer(),
        turn_done.clone(),
    ));
    (handle, turn_done)
}

/// Send, then wait until the renderer has taken the typing line down
async fn send_and_wait(widget: &mut ChatWidget, text: &str, turn_done: &Notify) -> SendOutcome {
    let outcome = widget.send(text).await;
    if outcome != SendOutcome::Ignored {
        turn_done.notified().await;
    }
    outcome
}
