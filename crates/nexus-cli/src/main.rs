//! nexus - terminal client for Nexus Spaces chat

mod commands;
mod config;
mod ui;

use clap::Parser;
use nexus_api::{HttpChatApi, User, http::BASE_URL_ENV};
use nexus_chat::{ChatController, ChatEvent};
use nexus_tui::Theme;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// nexus - chat with Nexus Spaces from the terminal
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://localhost:3000)
    #[arg(long)]
    base_url: Option<String>,

    /// User id to act as
    #[arg(short, long)]
    user: Option<String>,

    /// Bearer token for the backend
    #[arg(long)]
    token: Option<String>,

    /// Use the light color theme
    #[arg(long)]
    light: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// List conversations and exit
    #[arg(long)]
    list: bool,

    /// Open (or send to) this conversation
    #[arg(long)]
    conversation: Option<String>,

    /// Send a single message, print the reply, and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Start in a new conversation
    #[arg(long)]
    new: bool,
}

/// Install the tracing subscriber. The TUI owns the terminal, so its logs go
/// to a file; other modes log to stderr.
fn init_tracing(cfg: &config::Config, verbose: bool, tui: bool) {
    let default_filter = if verbose { "nexus=debug" } else { "nexus=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tui {
        let path = cfg.log_path();
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .init();
            }
            Err(e) => eprintln!("Warning: cannot open log file {}: {}", path.display(), e),
        }
    } else if verbose || std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

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

    let cfg = config::Config::load();
    let use_tui = !args.list && args.command.is_none();
    init_tracing(&cfg, args.verbose, use_tui);

    // Merge config with CLI args (CLI takes precedence)
    let base_url = args
        .base_url
        .or(cfg.base_url.clone())
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let Some(user_id) = args.user.or_else(|| cfg.user_id()) else {
        eprintln!("Error: No user id configured");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  1. Pass it on the command line: nexus --user <id>");
        eprintln!("  2. Set it in the environment: export {}=<id>", config::USER_ENV);
        eprintln!("  3. Add it to the config file: nexus --init-config");
        std::process::exit(1);
    };

    let mut api = HttpChatApi::new(&base_url)?;
    if let Some(token) = args.token.or_else(|| cfg.api_token()) {
        api = api.with_token(token);
    }
    tracing::info!("Connecting to {} as {}", base_url, user_id);

    let controller = Arc::new(ChatController::new(Arc::new(api), User::new(user_id)));

    if args.list || args.command.is_some() {
        let result = match args.command {
            Some(command) => run_command(&controller, args.conversation, args.new, &command).await,
            None => list_conversations(&controller).await,
        };
        if result.as_ref().is_err_and(is_unauthorized) {
            eprintln!(
                "Hint: the backend rejected the request; pass --token or set {}",
                config::TOKEN_ENV
            );
        }
        return result;
    }

    let theme = if args.light {
        Theme::light()
    } else {
        Theme::from_name(cfg.theme.as_deref().unwrap_or("dark"))
    };
    ui::run_tui(controller, theme, args.conversation, args.new).await
}

/// Whether `error` is the backend refusing our credentials
fn is_unauthorized(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<nexus_chat::Error>() {
        Some(nexus_chat::Error::Api(e)) => e.is_unauthorized(),
        _ => false,
    }
}

async fn list_conversations(controller: &ChatController) -> anyhow::Result<()> {
    controller.refresh_conversation_list().await?;
    let list = controller.store().conversation_list();

    if list.is_empty() {
        println!("No conversations yet.");
        println!("Start one with: nexus --new");
        return Ok(());
    }

    println!("{:<38} {:<17} Title", "ID", "Last activity");
    println!("{}", "-".repeat(80));
    for summary in &list {
        let marker = if summary.title.updated { "" } else { " *" };
        println!(
            "{:<38} {:<17} {}{}",
            summary.id,
            summary
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            summary.title.text,
            marker
        );
    }
    println!("\nOpen with: nexus --conversation <id>");
    Ok(())
}

async fn run_command(
    controller: &ChatController,
    conversation: Option<String>,
    new_chat: bool,
    text: &str,
) -> anyhow::Result<()> {
    controller.refresh_conversation_list().await?;
    let conversation_id = match conversation {
        Some(id) if !new_chat => {
            controller.select_conversation(id.clone()).await?;
            id
        }
        _ => controller.create_conversation().await?,
    };

    println!("nexus [{}]> {}", conversation_id, text);
    println!();

    let mut receiver = controller.subscribe();

    // Spawn event printer
    let printer = tokio::spawn(async move {
        let mut printed = 0;
        while let Ok(event) = receiver.recv().await {
            match event {
                ChatEvent::MessageMerged { message, .. } if !message.is_user => {
                    let text = message.text();
                    print!("{}", text.get(printed..).unwrap_or(""));
                    let _ = std::io::stdout().flush();
                    printed = text.len();
                }
                ChatEvent::Error { message } => {
                    eprintln!("\nError: {}", message);
                }
                event if event.is_terminal() => {
                    println!();
                    break;
                }
                _ => {}
            }
        }
    });

    match controller.send_message(&conversation_id, text, &[]).await {
        Ok(outcome) => {
            let _ = printer.await;
            if let Some(e) = outcome.stream_error {
                anyhow::bail!("Reply stream failed: {}", e);
            }
            Ok(())
        }
        Err(e) => {
            printer.abort();
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        let err = anyhow::Error::from(nexus_chat::Error::Api(nexus_api::Error::api(
            401,
            "missing token",
        )));
        assert!(is_unauthorized(&err));

        let err = anyhow::Error::from(nexus_chat::Error::Fetch("no list".into()));
        assert!(!is_unauthorized(&err));
        assert!(!is_unauthorized(&anyhow::anyhow!("other")));
    }
}
