//! Axum route handlers for the dashboard API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dashboard::orchestrator::{CoursesView, DashboardView, ResumeStatusView, ResumeUpload};
use crate::dashboard::session::Session;
use crate::dashboard::views::{
    render_skill_gap_svg, skill_gap_histogram, SkillCount, NO_MISSING_SKILLS_MESSAGE,
    SKILL_GAP_TITLE,
};
use crate::errors::AppError;
use crate::models::FeedbackValue;
use crate::state::AppState;

/// Multipart field carrying the resume.
const RESUME_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub view: DashboardView,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub index: usize,
    pub feedback: FeedbackValue,
}

#[derive(Debug, Serialize)]
pub struct SkillGapResponse {
    pub title: &'static str,
    pub skill_gap: Vec<SkillCount>,
    pub message: Option<&'static str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    let view = state.dashboard.render(&Session::new(), Vec::new());
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id, view }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardView>, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    Ok(Json(state.dashboard.render(&session, Vec::new())))
}

/// PUT /api/v1/sessions/:id/email
pub async fn handle_set_email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<DashboardView>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;
    session.enter_email(&req.email);
    Ok(Json(state.dashboard.render(&session, Vec::new())))
}

/// POST /api/v1/sessions/:id/resume (multipart, field `file`)
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<DashboardView>, AppError> {
    let session = find_session(&state, id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        if !bytes.is_empty() {
            upload = Some(ResumeUpload {
                file_name,
                content_type,
                bytes,
            });
        }
    }

    let session = session.lock().await;
    let notices = state.dashboard.upload_resume(&session, upload).await;
    Ok(Json(state.dashboard.render(&session, notices)))
}

/// POST /api/v1/sessions/:id/refresh
pub async fn handle_refresh_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardView>, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    let notices = state.dashboard.refresh_jobs(&session).await;
    Ok(Json(state.dashboard.render(&session, notices)))
}

/// POST /api/v1/sessions/:id/matches/load
pub async fn handle_load_matches(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardView>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;
    let notices = state.dashboard.load_matches(&mut session).await;
    Ok(Json(state.dashboard.render(&session, notices)))
}

/// POST /api/v1/sessions/:id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<DashboardView>, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    let notices = state
        .dashboard
        .record_feedback(&session, req.index, req.feedback)
        .await?;
    Ok(Json(state.dashboard.render(&session, notices)))
}

/// GET /api/v1/sessions/:id/skill-gap
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillGapResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    let skill_gap = skill_gap_histogram(session.matches());
    let message = skill_gap.is_empty().then_some(NO_MISSING_SKILLS_MESSAGE);
    Ok(Json(SkillGapResponse {
        title: SKILL_GAP_TITLE,
        skill_gap,
        message,
    }))
}

/// GET /api/v1/sessions/:id/skill-gap.svg
/// 204 when there is nothing to plot.
pub async fn handle_skill_gap_svg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    let histogram = skill_gap_histogram(session.matches());
    Ok(match render_skill_gap_svg(&histogram) {
        Some(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// GET /api/v1/sessions/:id/courses
pub async fn handle_courses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CoursesView>, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    Ok(Json(state.dashboard.suggest_courses(&session).await))
}

/// GET /api/v1/sessions/:id/resume/status
/// `status` is `null` until an identity has been entered.
pub async fn handle_resume_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeStatusView>, AppError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    Ok(Json(state.dashboard.resume_status(&session).await))
}
