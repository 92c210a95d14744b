use anyhow::Result;
use clap::{Parser, Subcommand};
use janus_admin::{config::Config, server, telemetry};
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

#[derive(Parser)]
#[command(name = "janus-admin", version, about = "Janus management plane")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let prometheus_handle = telemetry::init(&config.environment)?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting Janus Admin");
            info!("HTTP server listening on {}", config.http_addr());
            server::run(config, prometheus_handle).await
        }
        Command::Migrate => {
            let pool = MySqlPoolOptions::new()
                .max_connections(1)
                .connect(&config.database.url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Migrations applied");
            Ok(())
        }
    }
}
