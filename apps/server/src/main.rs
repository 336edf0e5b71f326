use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use chrono::Utc;
use std::sync::Arc;

use billboard::config;
use billboard::routes;
use billboard::services::{EmailRateLimiter, EmailService, Mailer, SmtpMailer};

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

    for var in config.email.missing_vars() {
        log::warn!("Warning: {} environment variable is not set", var);
    }
    if config.admin.api_token.is_none() {
        log::warn!("ADMIN_API_TOKEN not set, email health endpoints will reject every request");
    }

    log::info!("Starting Billboard server on {}:{}", config.host, config.port);

    // Mail transport is built once and shared
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config.email).map_err(|e| {
        log::error!("Mail transport error: {}", e);
        std::io::Error::other(e.to_string())
    })?);

    let limiter = Arc::new(EmailRateLimiter::new(config.rate_limit.clone()));
    spawn_rate_limit_purge(limiter.clone(), config.rate_limit.purge_interval);

    let email_service = web::Data::new(EmailService::new(&config, mailer, limiter));

    // Clone values for the closure
    let host = config.host.clone();
    let port = config.port;
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .app_data(config.clone())
            .app_data(email_service.clone())
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            // Health check (no auth required)
            .route("/health", web::get().to(routes::health::liveness))
            // Admin email routes (Bearer auth)
            .configure(routes::email_health::configure)
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

/// Periodically drops rate-limit records whose window has closed
fn spawn_rate_limit_purge(limiter: Arc<EmailRateLimiter>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(std::time::Duration::from_secs(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = limiter.purge_expired(Utc::now());
            if purged > 0 {
                log::debug!("Purged {} expired email rate-limit records", purged);
            }
        }
    });
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
