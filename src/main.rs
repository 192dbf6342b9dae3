// src/main.rs

use std::{process::ExitCode, sync::Arc};

use dotenvy::dotenv;
use minitwitter::{
    backend::{Backend, MemoryBackend, SupabaseBackend},
    config::Config,
    routes,
    state::AppState,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (if present)
    dotenv().ok();

    // Missing connection parameters are fatal before anything starts.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("minitwitter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let backend: Arc<dyn Backend> = if config.uses_memory_backend() {
        tracing::warn!("Using the in-process backend; all data is lost on exit.");
        Arc::new(MemoryBackend::new())
    } else {
        match SupabaseBackend::from_config(&config) {
            Ok(backend) => {
                tracing::info!("Backend: {}", config.supabase_url);
                Arc::new(backend)
            }
            Err(e) => {
                tracing::error!("Failed to initialise backend client: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    let addr = config.bind_addr;
    let app = routes::create_router(AppState::new(backend, config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("MiniTwitter listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Shut down cleanly.");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
