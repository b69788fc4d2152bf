// src/main.rs
// Stockroom - inventory tracking backend

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stockroom::{
    api, db,
    inventory::SqliteInventoryStore,
    report::{build_report, ReportOptions},
    state::create_app_state,
    upstream::UpstreamClient,
    StockroomConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Inventory tracking backend: projects, products and dashboard proxies")]
#[command(version)]
struct Cli {
    /// SQLite database URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Interface to bind
        #[arg(long, env = "STOCKROOM_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "STOCKROOM_PORT")]
        port: Option<u16>,
    },

    /// Apply database migrations and exit
    Migrate,

    /// Print dashboard totals
    Report {
        /// Limit the report to one project
        #[arg(long)]
        project: Option<i64>,

        /// Display currency (USD, EUR, GBP, JPY, KHR, ...)
        #[arg(short, long, default_value = "USD")]
        currency: String,

        /// Include current weather for the project's location
        #[arg(long, requires = "project")]
        weather: bool,
    },
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

async fn run_server(config: StockroomConfig) -> Result<()> {
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let app_state = create_app_state(config, pool);
    let app = api::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    info!("Stockroom API listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn run_migrate(config: &StockroomConfig) -> Result<()> {
    let pool = db::create_pool(&config.database_url, 1).await?;
    db::run_migrations(&pool).await?;
    let version = db::schema_version(&pool).await?;
    println!("Database at {} is at schema version {}", config.database_url, version);
    Ok(())
}

async fn run_report(config: &StockroomConfig, options: ReportOptions) -> Result<()> {
    let pool = db::create_pool(&config.database_url, 1).await?;
    db::run_migrations(&pool).await?;

    let store = SqliteInventoryStore::new(pool);
    let upstream = UpstreamClient::from_config(config);
    let report = build_report(&store, &store, &upstream, &options).await?;

    print!("{report}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from current directory
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = StockroomConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    init_tracing(&config.log_level)?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            config.validate()?;
            run_server(config).await?;
        }
        Commands::Migrate => {
            run_migrate(&config).await?;
        }
        Commands::Report {
            project,
            currency,
            weather,
        } => {
            config.validate()?;
            run_report(
                &config,
                ReportOptions {
                    project,
                    currency,
                    weather,
                },
            )
            .await?;
        }
    }

    Ok(())
}
