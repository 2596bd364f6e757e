//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for coaching
//! sessions, analyses, and workout generation. It uses `utoipa` doc comments
//! to generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;
use uuid::Uuid;

use spotter_core::CoachError;

use crate::{
    models::{
        AnalyzePayload, CoachingReplyView, ErrorResponse, FormAnalysisView, NutritionAnalysisView,
        ProgressAnalysisView, SendMessagePayload, SessionView, StartCoachingPayload,
        WorkoutPlanView, WorkoutRequestPayload,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::ServiceUnavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<CoachError> for ApiError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::NotInitialized => {
                Self::ServiceUnavailable("The coaching service is not initialized.".to_string())
            }
            CoachError::SessionNotFound(id) => {
                Self::NotFound(format!("Session with id '{}' not found", id))
            }
            CoachError::UnknownAction(action) => {
                Self::BadRequest(format!("Unknown action '{}'", action))
            }
            CoachError::Upstream(err) => Self::InternalServerError(err),
        }
    }
}

/// Start a new coaching session.
#[utoipa::path(
    post,
    path = "/sessions/coaching",
    request_body = StartCoachingPayload,
    responses(
        (status = 201, description = "Session created successfully", body = SessionView),
        (status = 503, description = "Service not initialized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn start_coaching_session(
    State(state): State<AppState>,
    Json(payload): Json<StartCoachingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let context = payload.context.unwrap_or_default();
    let session = state.service.try_start_coaching_session(context)?;
    Ok((StatusCode::CREATED, Json(SessionView::from(session))))
}

/// Send a message to a coaching session and get the coach's reply.
#[utoipa::path(
    post,
    path = "/sessions/coaching/{id}/messages",
    request_body = SendMessagePayload,
    responses(
        (status = 200, description = "Coach replied", body = CoachingReplyView),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 503, description = "Service not initialized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn send_coaching_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<Json<CoachingReplyView>, ApiError> {
    let (session, reply) = state
        .service
        .try_send_coaching_message(id, &payload.text)
        .await?;

    Ok(Json(CoachingReplyView {
        success: true,
        response: Some(reply),
        session_id: Some(session.id),
        error: None,
    }))
}

/// List all active sessions.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "List of active sessions", body = [SessionView])
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionView>> {
    let sessions = state
        .service
        .get_all_active_sessions()
        .into_iter()
        .map(SessionView::from)
        .collect();
    Json(sessions)
}

/// Get a specific active session by its ID.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .service
        .get_active_session(id)
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))?;
    Ok(Json(SessionView::from(session)))
}

/// End a session. The returned record is the last observation of it.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session ended", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .service
        .end_session(id)
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))?;
    Ok(Json(SessionView::from(session)))
}

/// Analyze exercise form from a captured image or clip.
#[utoipa::path(
    post,
    path = "/analyses/form",
    request_body = AnalyzePayload,
    responses(
        (status = 200, description = "Form analysis", body = FormAnalysisView),
        (status = 503, description = "Service not initialized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn analyze_form(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzePayload>,
) -> Result<Json<FormAnalysisView>, ApiError> {
    let analysis = state
        .service
        .try_analyze_exercise_form(&payload.media_ref)
        .await?;
    Ok(Json(FormAnalysisView::from(analysis)))
}

/// Analyze a progress photo.
#[utoipa::path(
    post,
    path = "/analyses/progress",
    request_body = AnalyzePayload,
    responses(
        (status = 200, description = "Progress analysis", body = ProgressAnalysisView),
        (status = 503, description = "Service not initialized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn analyze_progress(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzePayload>,
) -> Result<Json<ProgressAnalysisView>, ApiError> {
    let analysis = state
        .service
        .try_analyze_progress_photo(&payload.media_ref)
        .await?;
    Ok(Json(ProgressAnalysisView::from(analysis)))
}

/// Estimate nutrition facts from a meal photo.
#[utoipa::path(
    post,
    path = "/analyses/nutrition",
    request_body = AnalyzePayload,
    responses(
        (status = 200, description = "Nutrition analysis", body = NutritionAnalysisView),
        (status = 503, description = "Service not initialized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn analyze_nutrition(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzePayload>,
) -> Result<Json<NutritionAnalysisView>, ApiError> {
    let analysis = state
        .service
        .try_analyze_nutrition(&payload.media_ref)
        .await?;
    Ok(Json(NutritionAnalysisView::from(analysis)))
}

/// Generate a personalized workout plan.
#[utoipa::path(
    post,
    path = "/workouts",
    request_body = WorkoutRequestPayload,
    responses(
        (status = 200, description = "Generated workout plan", body = WorkoutPlanView),
        (status = 503, description = "Service not initialized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn generate_workout(
    State(state): State<AppState>,
    Json(payload): Json<WorkoutRequestPayload>,
) -> Result<Json<WorkoutPlanView>, ApiError> {
    let profile = payload.profile.into();
    let plan = state
        .service
        .try_generate_personalized_workout(&profile, &payload.goals, &payload.equipment)
        .await?;
    Ok(Json(WorkoutPlanView::from(plan)))
}
