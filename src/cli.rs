use clap::Parser;

#[derive(Parser)]
#[command(
    name = "vidchat",
    about = "Summarize a YouTube video and ask follow-up questions about it",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL to start with (prompted for if omitted)
    pub url: Option<String>,

    /// Caption languages to try, most preferred first
    #[arg(short, long, value_delimiter = ',')]
    pub lang: Vec<String>,

    /// LLM model used for the conversation
    #[arg(short, long)]
    pub model: Option<String>,

    /// List the video's caption tracks and exit
    #[arg(long)]
    pub list_tracks: bool,

    /// Show session and transcript details
    #[arg(short, long)]
    pub verbose: bool,
}
