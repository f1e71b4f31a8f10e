//! # Check-in Server
//!
//! Long-running service around the reading check-in engine:
//!
//! - broadcasts a rotating question to the configured Telegram channel,
//! - long-polls for replies and records them in PostgreSQL,
//! - serves a read-only query API over the recorded responses.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkin_core::broadcast::Broadcaster;
use checkin_core::catalog::QuestionCatalog;
use checkin_core::conversation::ConversationTable;
use checkin_core::router::ReplyRouter;
use checkin_core::store::{PgResponseStore, ResponseStore};
use checkin_core::transport::TelegramTransport;

use checkin_server::config::Config;
use checkin_server::routes;
use checkin_server::state::AppState;

const DB_MAX_CONNECTIONS: u32 = 5;
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "checkin-server")]
#[command(about = "Reading check-in bot with a response query API")]
struct Cli {
    /// Override the HTTP bind port
    #[arg(long)]
    port: Option<u16>,

    /// Override the HTTP bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env_file_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded .env file");
    }

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    run_server(config).await
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(&config.database.url)
        .await
        .context("database connection failed")?;
    info!("connected to PostgreSQL");

    checkin_core::MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("database schema up to date");

    let transport = Arc::new(TelegramTransport::new(&config.telegram.bot_token)?);
    let me = transport
        .get_me()
        .await
        .context("telegram rejected the bot credential")?;
    info!(
        bot = %me.username.as_deref().unwrap_or("<unnamed>"),
        "telegram bot connected"
    );

    match &config.telegram.channel {
        Some(channel) => info!(
            channel = %channel,
            period = ?config.checkin.period,
            questions = config.checkin.questions.len(),
            "check-in broadcasts enabled"
        ),
        None => warn!(
            "TELEGRAM_CHANNEL_ID not configured; check-in broadcasts degraded to no-ops"
        ),
    }

    let conversations = Arc::new(ConversationTable::new());
    let store: Arc<dyn ResponseStore> = Arc::new(PgResponseStore::new(pool.clone()));
    let reply_router = Arc::new(ReplyRouter::new(
        Arc::clone(&conversations),
        Arc::clone(&store),
        transport.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let broadcaster = Broadcaster::new(
        QuestionCatalog::new(config.checkin.questions.clone()),
        Arc::clone(&conversations),
        transport.clone(),
        config.telegram.channel.clone(),
        config.checkin.period,
    );
    let broadcast_task = tokio::spawn(broadcaster.run(shutdown_rx.clone()));

    let mut events = transport.subscribe(shutdown_rx);
    let router_for_events = Arc::clone(&reply_router);
    let inbound_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            router_for_events.handle_event(event).await;
        }
    });

    let app = routes::create_api_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "query API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    // Drain: in-flight broadcasts and replies finish before exit, so no
    // acknowledgement is sent without its stored row.
    let _ = broadcast_task.await;
    let _ = inbound_task.await;
    info!("check-in service stopped");
    Ok(())
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received; draining in-flight work");
    let _ = shutdown_tx.send(true);
}
