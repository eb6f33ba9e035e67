use clap::Parser;
use search_console::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("search_console=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = search_console::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => tracing::error!("{e:?}"),
            _ => tracing::error!("{e}"),
        }
        std::process::exit(1);
    }
}
