//! Terminal D&D narrator.
//!
//! Reads player actions line by line and prints the narrator's replies.
//!
//! ```bash
//! APP_URL=http://localhost:11434 APP_MODEL=llama3.1 cargo run -p narrator
//! ```

mod console;

use narrator_core::{Orchestrator, Settings};
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so the story on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Set APP_URL and APP_MODEL in a .env file or the environment.");
            std::process::exit(1);
        }
    };
    debug!(
        url = %settings.base_url,
        model = %settings.model,
        lore = settings.lore_endpoint(),
        "settings loaded"
    );

    let mut orchestrator = match Orchestrator::from_settings(&settings) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = console::run(&mut orchestrator, stdin.lock(), stdout.lock()).await {
        eprintln!("Unexpected error: {e}");
        std::process::exit(1);
    }
}
