use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use configs::AppConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use service::data_migration::MigrationLoader;
use service::runtime::Backends;

#[derive(Parser, Debug)]
#[command(name = "migrate", version, about = "Portfolio store maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy each top-level field of the source document into the settings store
    Data {
        /// Source JSON; defaults to `migration.source_path`
        #[arg(long, env = "MIGRATION_SOURCE")]
        source: Option<PathBuf>,
    },
    /// Apply pending schema migrations
    Schema,
    /// Create the admin user or reset its password
    SeedUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

async fn execute(cli: Cli) -> anyhow::Result<std::process::ExitCode> {
    let cfg = AppConfig::load_or_env().context("load configuration")?;
    let backends = Backends::connect(&cfg).await?;
    backends.apply_schema().await?;

    let code = match cli.command {
        Command::Data { source } => {
            let source = source.unwrap_or_else(|| PathBuf::from(&cfg.migration.source_path));
            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let mut loader = MigrationLoader::new(backends.settings_service(&cfg.settings));
            let report = loader.run(Some(&source), &cancel).await?;
            match report.into_result() {
                Ok(report) => {
                    info!(event = "migration_done", migrated = ?report.migrated, "data migration completed");
                    std::process::ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(event = "migration_failed", error = %e, "data migration incomplete");
                    std::process::ExitCode::FAILURE
                }
            }
        }
        Command::Schema => std::process::ExitCode::SUCCESS,
        Command::SeedUser { username, password } => {
            let user = backends.auth_service().seed_user(&username, &password).await?;
            info!(event = "user_seeded", username = %user.username, "admin user ready");
            std::process::ExitCode::SUCCESS
        }
    };

    backends.shutdown().await?;
    Ok(code)
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(event = "migrate_failed", error = %e, "migrate aborted");
            std::process::ExitCode::FAILURE
        }
    }
}
