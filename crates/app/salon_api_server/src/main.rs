//! Salon admin API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use salon_api::AppState;
use salon_api::config::ApiConfig;
use salon_api::services::bootstrap::{self, BootstrapAdmin};
use salon_core::store::{MemoryStore, PgStore};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "salon_api_server", about = "Salon admin API server")]
struct Args {
    /// Port to listen on; overrides the port of `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/salon"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep all data in process memory instead of PostgreSQL. Nothing survives a restart.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,salon_api=debug,salon_core=debug")),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.pg_connection_url = args.database_url.clone();
    let mut bind_addr: SocketAddr = config.bind_addr.parse()?;
    if let Some(port) = args.port {
        bind_addr.set_port(port);
    }
    config.bind_addr = bind_addr.to_string();

    info!(?config, in_memory = args.in_memory, "starting salon_api_server");

    let state = if args.in_memory {
        warn!("using in-memory store; data is lost on exit");
        AppState::new(Arc::new(MemoryStore::new()), config)
    } else {
        info!(max_connections = args.max_connections, "configuring connection pool");
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&args.database_url)
            .await?;

        info!("running database migrations");
        salon_api::migrate(&pool).await?;

        AppState::new(Arc::new(PgStore::new(pool)), config)
    };

    match BootstrapAdmin::from_env() {
        Some(seed) => {
            bootstrap::ensure_admin(state.users.as_ref(), &state.config, &seed).await?;
        }
        None => info!("BOOTSTRAP_ADMIN_EMAIL/PASSWORD not set, skipping admin seeding"),
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let app = salon_api::router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}
