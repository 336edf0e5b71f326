use actix_web::{http::StatusCode, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::auth::AdminAuth;
use crate::error::{AppError, AppResult};
use crate::models::{ClearRateLimit, RateLimitStatus};
use crate::services::{EmailService, SmtpSummary};

#[derive(Serialize)]
pub struct EmailHealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    smtp: SmtpSummary,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ClearRateLimitResponse {
    success: bool,
    message: String,
    cleared: usize,
}

#[derive(Serialize)]
pub struct RateLimitStatusResponse {
    email: String,
    limits: BTreeMap<&'static str, RateLimitStatus>,
}

/// GET /api/email-health - Run the mail configuration self-test
/// Returns 200 when healthy, 503 otherwise.
pub async fn email_health(
    service: web::Data<EmailService>,
    _admin: AdminAuth,
) -> HttpResponse {
    let health = service.test_email_config().await;

    let (status, http_status) = if health.success {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    HttpResponse::build(http_status).json(EmailHealthResponse {
        status,
        timestamp: Utc::now(),
        smtp: service.smtp_summary(),
        success: health.success,
        error: health.error,
    })
}

/// POST /api/email-health - Clear rate limits for a recipient
pub async fn clear_rate_limit(
    service: web::Data<EmailService>,
    _admin: AdminAuth,
    body: web::Json<ClearRateLimit>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner();
    let email = input
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let cleared = service.limiter().clear(&email, input.category);
    let message = match input.category {
        Some(category) => format!("Rate limit cleared for {} ({})", email, category),
        None => format!("Rate limit cleared for {}", email),
    };
    log::info!("{}", message);

    Ok(HttpResponse::Ok().json(ClearRateLimitResponse {
        success: true,
        message,
        cleared,
    }))
}

/// GET /api/email-health/rate-limits/{email} - Current windows per category
pub async fn rate_limit_status(
    service: web::Data<EmailService>,
    _admin: AdminAuth,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    let limits = service.limiter().status(&email);

    HttpResponse::Ok().json(RateLimitStatusResponse { email, limits })
}

/// Configure email health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/email-health")
            .route("", web::get().to(email_health))
            .route("", web::post().to(clear_rate_limit))
            .route("/rate-limits/{email}", web::get().to(rate_limit_status)),
    );
}
