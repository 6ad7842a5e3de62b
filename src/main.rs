use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use employee_directory::admission::Admission;
use employee_directory::config::{Args, QuotaPolicy};
use employee_directory::rate_limit::sweeper;
use employee_directory::router;
use employee_directory::state::AppState;
use employee_directory::store::EmployeeStore;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "employee_directory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();
    let policy = args.quota_policy()?;
    let sweep_interval = args.sweep_interval()?;

    let store = EmployeeStore::connect(&args.database_url, args.max_connections).await?;
    store.init().await?;
    tracing::info!(database_url = %args.database_url, "Database initialized successfully");

    let admission = Admission::from_policy(&policy)?;

    // background cleanup of idle clients
    let pools = admission.limiters();
    tokio::spawn(async move {
        sweeper(pools, sweep_interval).await;
    });

    let state = Arc::new(AppState { store, admission });
    let app = router(state.clone());

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Employee directory listening");
    match &policy {
        QuotaPolicy::Shared(limit) => tracing::info!(
            max_requests = limit.max_requests,
            window = ?limit.window,
            "Rate limit: one shared pool per client"
        ),
        QuotaPolicy::PerRoute {
            health,
            read,
            write,
        } => tracing::info!(
            health = health.max_requests,
            read = read.max_requests,
            write = write.max_requests,
            window = ?read.window,
            "Rate limit: one pool per route class"
        ),
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    state.store.pool().close().await;
    tracing::info!("Application shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
