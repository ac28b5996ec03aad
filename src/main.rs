use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use eyre::{Result, bail};
use log::{info, warn};

mod cli;

use cli::Cli;
use vidchat::fetcher::TranscriptFetcher;
use vidchat::llm::HttpChatModel;
use vidchat::memory::InMemoryStore;
use vidchat::youtube::{CaptionService, YouTubeCaptions};
use vidchat::{Conversation, output};

const URL_LABEL: &str = "Enter a YouTube video URL to summarize";
const QUESTION_LABEL: &str = "Ask me here if you need more details";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("vidchat.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidchat")
        .join("logs")
}

fn key_status(var: &str) -> String {
    match std::env::var(var) {
        Ok(_) => format!("  \x1b[32m✅\x1b[0m {var}"),
        Err(_) => format!("  \x1b[31m❌\x1b[0m {var} (not set)"),
    }
}

fn build_after_help() -> String {
    let log_path = log_dir().join("vidchat.log");

    format!(
        "\nAPI KEYS:\n{}\n{}\n\nCOMMANDS (inside the chat):\n  /reset     start over with a new video\n  /history   show the conversation so far\n  /quit      leave\n\nConfig is read from: {}\nLogs are written to: {}",
        key_status("ANTHROPIC_API_KEY"),
        key_status("OPENAI_API_KEY"),
        vidchat::config::config_path().display(),
        log_path.display()
    )
}

fn prompt_line(label: &str, stdin: &mut impl BufRead) -> Result<Option<String>> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn list_tracks(captions: &YouTubeCaptions, url: Option<&str>, languages: &[String]) -> Result<()> {
    let Some(url) = url else {
        bail!("--list-tracks needs a video URL\n\nUsage: vidchat --list-tracks <URL>");
    };

    let (video_id, _) = vidchat::resolve(url)?;
    let tracks = captions.list_tracks(&video_id).await?;
    println!("{}", output::render_tracks(&tracks, languages));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = vidchat::config::Config::load().unwrap_or_default();

    // CLI flags take priority over the config file
    let cli_languages = vidchat::config::normalize_languages(&cli.lang);
    let languages = if cli_languages.is_empty() { config.languages() } else { cli_languages };
    let mut settings = config.model_settings();
    if let Some(ref model) = cli.model {
        settings.model = model.clone();
    }

    let client = reqwest::Client::new();
    let captions = YouTubeCaptions::new(client.clone());

    if cli.list_tracks {
        return list_tracks(&captions, cli.url.as_deref(), &languages).await;
    }

    if cli.verbose {
        eprintln!("Model: {}\nLanguages: {}", settings.model, languages.join(", "));
    }

    let fetcher = TranscriptFetcher::with_languages(captions, languages);
    let mut conversation = Conversation::new(fetcher, HttpChatModel::new(client, settings), InMemoryStore::new());
    info!("Started session {}", conversation.session_id());
    if cli.verbose {
        eprintln!("Session: {}", conversation.session_id());
    }

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut pending = cli.url.clone();

    loop {
        let input = match pending.take() {
            Some(url) => url,
            None => {
                let label = if conversation.awaiting_url() { URL_LABEL } else { QUESTION_LABEL };
                match prompt_line(label, &mut stdin)? {
                    Some(line) => line,
                    None => break,
                }
            }
        };

        match input.as_str() {
            "/quit" | "/exit" => break,
            "/reset" => {
                conversation.reset();
                println!("Starting over.");
                continue;
            }
            "/history" => {
                println!("{}", output::render_history(&conversation.history()));
                continue;
            }
            _ => {}
        }

        match conversation.submit(&input).await {
            Ok(Some(turn)) => {
                if cli.verbose {
                    eprintln!("Sent {} bytes to the model", turn.input.len());
                }
                println!("{}", output::render_answer(&turn));
            }
            Ok(None) => {}
            Err(e) => {
                if e.is_transient() {
                    warn!("Turn failed: {e}");
                } else {
                    info!("Turn rejected: {e}");
                }
                eprintln!("{}", e.user_message());
            }
        }
    }

    Ok(())
}
