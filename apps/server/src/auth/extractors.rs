use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::error::AppError;

/// Extractor for the admin Bearer token (email health endpoints)
///
/// Usage in handlers:
/// ```ignore
/// async fn my_handler(_admin: AdminAuth) -> HttpResponse {
///     // only reached with a valid ADMIN_API_TOKEN
/// }
/// ```
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let expected = match req.app_data::<web::Data<Config>>() {
            Some(config) => config.admin.api_token.clone(),
            None => {
                return Box::pin(async {
                    Err(AppError::Internal("Configuration not available".to_string()))
                });
            }
        };

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        Box::pin(async move {
            // No token configured: the admin surface is closed
            let expected = expected.ok_or_else(|| {
                log::warn!("Admin request rejected: ADMIN_API_TOKEN is not set");
                AppError::Unauthorized("Admin access is not configured".to_string())
            })?;

            let header = auth_header.ok_or_else(|| {
                AppError::Unauthorized("Missing Authorization header".to_string())
            })?;

            let token = header.strip_prefix("Bearer ").ok_or_else(|| {
                AppError::Unauthorized(
                    "Invalid Authorization header format, expected 'Bearer <token>'".to_string(),
                )
            })?;

            if !constant_time_eq(token.trim().as_bytes(), expected.as_bytes()) {
                return Err(AppError::Unauthorized("Invalid Bearer token".to_string()));
            }

            Ok(AdminAuth)
        })
    }
}

/// Compares without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
