//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AnalyzePayload, AthleteProfilePayload, CoachingReplyView, ErrorResponse, FormAnalysisView,
        NutritionAnalysisView, ProgressAnalysisView, SendMessagePayload, SessionView,
        StartCoachingPayload, TranscriptEntryView, WorkoutExerciseView, WorkoutPlanView,
        WorkoutRequestPayload,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::start_coaching_session,
        handlers::send_coaching_message,
        handlers::list_sessions,
        handlers::get_session,
        handlers::end_session,
        handlers::analyze_form,
        handlers::analyze_progress,
        handlers::analyze_nutrition,
        handlers::generate_workout,
    ),
    components(
        schemas(
            SessionView,
            TranscriptEntryView,
            StartCoachingPayload,
            SendMessagePayload,
            CoachingReplyView,
            AnalyzePayload,
            FormAnalysisView,
            ProgressAnalysisView,
            NutritionAnalysisView,
            AthleteProfilePayload,
            WorkoutRequestPayload,
            WorkoutPlanView,
            WorkoutExerciseView,
            ErrorResponse
        )
    ),
    tags(
        (name = "Spotter API", description = "Session management and coaching for the Spotter fitness assistant")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: AppState) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/coaching", post(handlers::start_coaching_session))
        .route(
            "/sessions/coaching/{id}/messages",
            post(handlers::send_coaching_message),
        )
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::end_session),
        )
        .route("/analyses/form", post(handlers::analyze_form))
        .route("/analyses/progress", post(handlers::analyze_progress))
        .route("/analyses/nutrition", post(handlers::analyze_nutrition))
        .route("/workouts", post(handlers::generate_workout))
        .route("/ws", get(ws_handler))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Create the final router that merges the stateful routes
    // with the stateless routes (like Swagger UI).
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
