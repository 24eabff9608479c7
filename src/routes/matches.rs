use crate::core::Matcher;
use crate::models::{
    ErrorResponse, HealthResponse, ResultsResponse, RunMatchingRequest, RunMatchingResponse,
    SubmitScoresRequest, SubmitScoresResponse,
};
use crate::services::{PostgresClient, PostgresError};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/surveys/{user_id}/scores", web::put().to(submit_scores))
        .route("/matches/run", web::post().to(run_matching))
        .route("/matches/results/{client_id}", web::get().to(get_results));
}

fn storage_error(context: &str, err: PostgresError) -> HttpResponse {
    match err {
        PostgresError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: what,
            status_code: 404,
        }),
        PostgresError::InvalidInput(why) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_input".to_string(),
            message: why,
            status_code: 400,
        }),
        other => {
            tracing::error!("{}: {}", context, other);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: context.to_string(),
                message: other.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Submit or replace a user's rating vector
///
/// PUT /api/v1/surveys/{user_id}/scores
///
/// Request body:
/// ```json
/// { "scores": [5, 3, 9, 1] }
/// ```
///
/// One score in [1, 9] per registered criterion, in criterion order.
async fn submit_scores(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<SubmitScoresRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for submit_scores request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if !req.scores_in_range() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: "Every score must be an integer between 1 and 9".to_string(),
            status_code: 400,
        });
    }

    let user_id = path.into_inner();

    match state.postgres.upsert_scores(user_id, &req.scores).await {
        Ok(saved) => HttpResponse::Ok().json(SubmitScoresResponse {
            user_id,
            scores_saved: saved,
        }),
        Err(e) => storage_error("Failed to save scores", e),
    }
}

/// Run the matching algorithm for a client
///
/// POST /api/v1/matches/run
///
/// Request body:
/// ```json
/// { "clientId": 42 }
/// ```
///
/// Loads the client's rating vector and all survey-complete therapist
/// vectors, ranks the therapists, and replaces the client's persisted result
/// set. Zero eligible therapists is a valid outcome: the response carries an
/// empty match list and any stale results are cleared.
async fn run_matching(
    state: web::Data<AppState>,
    req: web::Json<RunMatchingRequest>,
) -> impl Responder {
    let client_id = req.client_id;

    tracing::info!(client_id, "running matching");

    let client = match state.postgres.get_rating_vector(client_id).await {
        Ok(profile) => profile,
        Err(e) => return storage_error("Failed to fetch client scores", e),
    };

    let therapists = match state.postgres.get_therapist_vectors().await {
        Ok(vectors) => vectors,
        Err(e) => return storage_error("Failed to fetch therapist scores", e),
    };

    let outcome = state.matcher.rank(&client, &therapists);

    if let Err(e) = state
        .postgres
        .replace_results(client_id, &outcome.matches)
        .await
    {
        return storage_error("Failed to persist results", e);
    }

    tracing::info!(
        client_id,
        matches = outcome.matches.len(),
        total_candidates = outcome.total_candidates,
        "matching complete"
    );

    HttpResponse::Ok().json(RunMatchingResponse {
        client_id,
        matches: outcome.matches,
        total_candidates: outcome.total_candidates,
        criterion_consistency: outcome.criterion_consistency,
    })
}

/// Read a client's persisted ranking
///
/// GET /api/v1/matches/results/{client_id}
async fn get_results(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let client_id = path.into_inner();

    match state.postgres.get_results(client_id).await {
        Ok(results) => HttpResponse::Ok().json(ResultsResponse { client_id, results }),
        Err(e) => storage_error("Failed to fetch results", e),
    }
}
