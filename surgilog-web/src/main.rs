//! surgilog-web - Surgical training logbook service
//!
//! Residents perform surgeries under teacher supervision; each performance is
//! tracked as a record that residents complete and teachers review or
//! correct. Serves the HTTP API and the embedded web UI.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use surgilog_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "surgilog-web", version, about = "Surgical training logbook service")]
struct Args {
    /// Root folder holding surgilog.db (overrides SURGILOG_ROOT)
    #[arg(long)]
    root: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5780)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Surgilog (surgilog-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Resolve root folder and open the database
    let root = surgilog_common::config::resolve_root_folder(args.root.as_deref());
    surgilog_common::config::ensure_root_folder(&root)?;

    let db_path = surgilog_common::config::database_path(&root);
    info!("Database path: {}", db_path.display());

    let pool = surgilog_common::db::connect(&db_path).await?;
    info!("Database connection established");

    // Bootstrap the initial admin account if no users exist
    if let Some(password) = surgilog_web::db::users::bootstrap_admin(&pool).await? {
        info!("Created initial admin account 'admin' (password: {})", password);
        info!("Change this password after first login");
    }

    // Drop sessions that expired while the service was down
    let removed = surgilog_web::db::sessions::cleanup_expired(&pool).await?;
    if removed > 0 {
        info!("Removed {} expired session(s)", removed);
    }

    // Periodic sweep at the configured interval
    let interval = surgilog_web::db::sessions::cleanup_interval(&pool).await?;
    info!("Session cleanup every {}s", interval.as_secs());
    let cleanup_pool = pool.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // the first tick completes immediately
        loop {
            ticker.tick().await;
            match surgilog_web::db::sessions::cleanup_expired(&cleanup_pool).await {
                Ok(n) if n > 0 => info!("Removed {} expired session(s)", n),
                Ok(_) => {}
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    });

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((args.bind.as_str(), args.port)).await?;
    info!("surgilog-web listening on http://{}:{}", args.bind, args.port);
    info!("Health check: http://{}:{}/health", args.bind, args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
