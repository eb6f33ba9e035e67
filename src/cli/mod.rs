use clap::{Parser, Subcommand};
use serde_json::json;

use crate::config;
use crate::database::DatabaseManager;
use crate::services::SessionService;

#[derive(Parser, Debug)]
#[command(name = "search-console")]
#[command(about = "Search console API: data sources, consoles and a Vespa query proxy")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run migrations and start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,

        #[arg(long, help = "Shut down when standard input is closed (supervised runs)")]
        exit_on_stdin_close: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Delete expired sessions and exit")]
    PruneSessions,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::config().clone();

    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        exit_on_stdin_close: false,
    });

    match command {
        Commands::Serve { port, exit_on_stdin_close } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            crate::server::serve(config, exit_on_stdin_close).await
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            report(cli.json, "Migrations applied", json!({ "migrated": true }));
            Ok(())
        }
        Commands::PruneSessions => {
            let pool = DatabaseManager::connect(&config.database).await?;
            let max_age_secs = config.session.max_age_days * 24 * 60 * 60;
            let pruned = SessionService::new(pool, max_age_secs).prune_expired().await?;
            report(
                cli.json,
                &format!("Pruned {} expired session(s)", pruned),
                json!({ "pruned": pruned }),
            );
            Ok(())
        }
    }
}

fn report(as_json: bool, text: &str, value: serde_json::Value) {
    if as_json {
        println!("{}", value);
    } else {
        println!("{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["search-console"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.json);
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["search-console", "serve", "--port", "9000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve { port: Some(9000), exit_on_stdin_close: false })
        );

        let cli = Cli::try_parse_from(["search-console", "serve", "--exit-on-stdin-close"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve { port: None, exit_on_stdin_close: true })
        );

        let cli = Cli::try_parse_from(["search-console", "prune-sessions", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::PruneSessions));
        assert!(cli.json);

        assert!(Cli::try_parse_from(["search-console", "frobnicate"]).is_err());
    }
}
