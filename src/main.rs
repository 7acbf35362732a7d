//! CodeGrade - Application Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use bollard::Docker;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use codegrade::{
    config::CONFIG,
    db::{self, InMemoryProblemStore, InMemorySubmissionStore, PgProblemStore, PgSubmissionStore},
    db::{ProblemStore, SubmissionStore},
    handlers,
    judge::ContainerSandbox,
    services::ExecuteService,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let json_logs = CONFIG.server.json_logs;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(fmt::layer))
        .init();

    tracing::info!("Starting CodeGrade server...");

    let (problems, submissions) = connect_stores().await?;

    // Initialize Docker client
    tracing::info!("Connecting to Docker...");
    let docker = match &CONFIG.sandbox.docker_socket {
        Some(socket) => Docker::connect_with_socket(socket, 120, bollard::API_DEFAULT_VERSION)?,
        None => Docker::connect_with_socket_defaults()?,
    };

    let docker_info = docker.version().await?;
    tracing::info!(
        "Connected to Docker version: {}",
        docker_info.version.unwrap_or_default()
    );

    let sandbox = ContainerSandbox::new(docker, CONFIG.sandbox.clone(), CONFIG.languages.clone());
    if CONFIG.sandbox.pull_images {
        sandbox.prepare_images().await?;
    }
    tracing::info!(
        timeout_ms = CONFIG.sandbox.timeout_ms,
        max_concurrency = CONFIG.sandbox.max_concurrency,
        work_dir = %CONFIG.sandbox.work_dir.display(),
        "Sandbox ready"
    );

    let execute = ExecuteService::new(problems, submissions, Arc::new(sandbox.clone()));
    let app = handlers::app(AppState::new(execute));

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    // live containers are killed before in-flight requests are drained
    let shutdown = async move {
        shutdown_signal().await;
        sandbox.kill_all().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("CodeGrade shutdown complete");
    Ok(())
}

/// Postgres stores when a database is configured, in-memory stores otherwise
async fn connect_stores() -> anyhow::Result<(Arc<dyn ProblemStore>, Arc<dyn SubmissionStore>)> {
    let Some(url) = &CONFIG.database.url else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores");
        let problems = if CONFIG.database.seed_demo_problems {
            InMemoryProblemStore::with_demo_problems()
        } else {
            InMemoryProblemStore::new()
        };
        return Ok((Arc::new(problems), Arc::new(InMemorySubmissionStore::new())));
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(url, CONFIG.database.max_connections).await?;
    db::test_connection(&pool).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    if CONFIG.database.seed_demo_problems {
        let inserted = db::seed_demo_problems(&pool).await?;
        tracing::info!(inserted, "Demo problems seeded");
    }

    Ok((
        Arc::new(PgProblemStore::new(pool.clone())),
        Arc::new(PgSubmissionStore::new(pool)),
    ))
}

/// Resolves on ctrl-c or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
