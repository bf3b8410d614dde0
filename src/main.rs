use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use chrono::Duration;

use namesentry::config;
use namesentry::github::GithubClient;
use namesentry::routes;
use namesentry::services::{LocalRateLimiter, MemoryStorage, VisitStats};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!(
        "Starting NameSentry server on {}:{}",
        config.host,
        config.port
    );

    // A missing token is not fatal at startup: endpoints answer with a
    // configuration error per request instead.
    let github: Option<GithubClient> = match GithubClient::new(&config.github) {
        Ok(client) => Some(client),
        Err(e) => {
            log::warn!("GitHub client unavailable: {}", e);
            None
        }
    };

    // Shared state must be built outside the factory closure so every worker
    // sees the same counters.
    let github = web::Data::new(github);
    let limiter = web::Data::new(Mutex::new(LocalRateLimiter::new(
        Box::new(MemoryStorage::new()),
        config.rate_limit.max_requests,
        Duration::seconds(config.rate_limit.window_secs),
    )));
    let visits = web::Data::new(Mutex::new(VisitStats::new()));

    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        // Permissive CORS: the search surface is public and read-only, and
        // visit recording carries nothing worth protecting.
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .app_data(github.clone())
            .app_data(limiter.clone())
            .app_data(visits.clone())
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            // Routes
            .configure(routes::health::configure)
            .configure(routes::search::configure)
            .configure(routes::rate_limit::configure)
            .configure(routes::analytics::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
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
}
