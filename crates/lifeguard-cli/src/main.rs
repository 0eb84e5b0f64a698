use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use lifeguard::clients::PoolApiClient;
use lifeguard::config::Settings;

mod commands {
    pub mod health;
    pub mod session;
}
mod prompt;
mod session;

use commands::session::build_session;
use session::Outcome;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use (overrides LIFEGUARD_PROVIDER__MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the product and store service (overrides LIFEGUARD_API__BASE_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Template file for the system instruction
    #[arg(long, value_name = "FILE")]
    system_prompt: Option<PathBuf>,

    /// Write the conversation to this file as JSON lines after every answer
    #[arg(long, value_name = "FILE")]
    session_file: Option<PathBuf>,

    /// Ask a single question, print the answer and exit
    #[arg(long, value_name = "TEXT")]
    message: Option<String>,

    /// Check that the product service is reachable and exit
    #[arg(long, conflicts_with = "message")]
    health: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.provider.model = model.clone();
        }
        if let Some(url) = &self.api_url {
            settings.api.base_url = url.clone();
        }
        if let Some(path) = &self.system_prompt {
            settings.system_prompt_path = Some(path.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    let mut settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", style("Error:").bold().red(), e);
            std::process::exit(2);
        }
    };
    cli.apply(&mut settings);

    if cli.health {
        let client = PoolApiClient::new(&settings.api.base_url, settings.api_timeout())?;
        return commands::health::execute(&client).await;
    }

    let mut chat = build_session(settings, cli.session_file.clone())?;

    match &cli.message {
        Some(message) => match chat.headless(message).await? {
            Outcome::Answered(_) => Ok(()),
            Outcome::Failed(_) => std::process::exit(1),
            Outcome::Interrupted => std::process::exit(130),
        },
        None => chat.start().await,
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
