use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{AuthError, Authenticator};
use crate::core::{EnrichError, MatchEnricher, MatchRecorder, RecordError};
use crate::models::{
    CreateMatchRequest, ErrorResponse, HealthResponse, MatchResponse, ResetMatchesResponse,
    StylistMatchesResponse,
};
use crate::services::MatchStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MatchStore>,
    pub enricher: MatchEnricher,
    pub recorder: MatchRecorder,
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(store: Arc<dyn MatchStore>, auth: Authenticator) -> Self {
        Self {
            enricher: MatchEnricher::new(store.clone()),
            recorder: MatchRecorder::new(store.clone()),
            store,
            auth,
        }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/stylists/{stylist_id}/matches", web::get().to(stylist_matches))
        .route("/matches", web::post().to(create_match))
        .route("/users/{user_id}/matches", web::delete().to(reset_matches));
}

fn error_response(status: u16, error: &str, message: String) -> HttpResponse {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    };
    match status {
        400 => HttpResponse::BadRequest().json(body),
        401 => HttpResponse::Unauthorized().json(body),
        403 => HttpResponse::Forbidden().json(body),
        409 => HttpResponse::Conflict().json(body),
        502 => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn auth_error_response(err: AuthError) -> HttpResponse {
    match err {
        AuthError::Forbidden(_) => error_response(403, "Forbidden", err.to_string()),
        _ => error_response(401, "Unauthorized", err.to_string()),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Enriched matches for a stylist
///
/// GET /api/v1/stylists/{stylist_id}/matches
async fn stylist_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    let stylist_id = path.into_inner();

    if let Err(e) = state.auth.authorize(&http_req, &stylist_id) {
        return auth_error_response(e);
    }

    tracing::info!("Loading matches for stylist: {}", stylist_id);

    match state.enricher.enrich_for_stylist(&stylist_id).await {
        Ok(matches) => {
            tracing::info!("Returning {} matches for stylist {}", matches.len(), stylist_id);
            HttpResponse::Ok().json(StylistMatchesResponse {
                stylist_id,
                total: matches.len(),
                matches,
            })
        }
        Err(e @ EnrichError::LookupFailure { .. }) => {
            error_response(502, "failed to load matches", e.to_string())
        }
    }
}

/// Record a "like" swipe
///
/// POST /api/v1/matches
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "stylistId": "string"
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    req: web::Json<CreateMatchRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(e) = state.auth.authorize(&http_req, req.user_id.trim()) {
        return auth_error_response(e);
    }

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_match request: {:?}", errors);
        return error_response(400, "Validation failed", errors.to_string());
    }

    match state.recorder.record_like(req.into_inner().into()).await {
        Ok(created) => HttpResponse::Created().json(MatchResponse::from(created)),
        Err(e) => record_error_response(e, "Failed to record match"),
    }
}

/// Delete every match a user created
///
/// DELETE /api/v1/users/{user_id}/matches
async fn reset_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    let user_id = path.into_inner();

    if let Err(e) = state.auth.authorize(&http_req, &user_id) {
        return auth_error_response(e);
    }

    match state.recorder.reset(&user_id).await {
        Ok(deleted) => HttpResponse::Ok().json(ResetMatchesResponse { user_id, deleted }),
        Err(e) => record_error_response(e, "Failed to reset matches"),
    }
}

fn record_error_response(err: RecordError, context: &str) -> HttpResponse {
    match err {
        RecordError::InvalidInput(_) | RecordError::SelfMatch | RecordError::NotAStylist(_) => {
            error_response(400, "Invalid match", err.to_string())
        }
        RecordError::AlreadyMatched { .. } => error_response(409, "Already matched", err.to_string()),
        RecordError::Store(ref e) => {
            tracing::error!("{}: {}", context, e);
            error_response(502, context, err.to_string())
        }
    }
}
