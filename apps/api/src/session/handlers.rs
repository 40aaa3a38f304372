use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::controller::{run_generation, run_upload, InputsPatch, ResumeUpload};
use super::view::SessionView;
use crate::errors::AppError;
use crate::export::{export_filename, render_cover_letter_pdf};
use crate::extraction::ExtractionError;
use crate::generation::mode::GenerationMode;
use crate::generation::tone::Tone;
use crate::state::AppState;

pub const NOTHING_TO_EXPORT_MESSAGE: &str = "There is no cover letter to export yet.";

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create(state.store.clone()).await;
    let view = session.lock().await.view();
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// PATCH /api/v1/sessions/:id/inputs
pub async fn handle_update_inputs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<InputsPatch>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.update_inputs(patch);
    Ok(Json(session.view()))
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: GenerationMode,
}

/// PUT /api/v1/sessions/:id/mode
pub async fn handle_select_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.select_mode(req.mode)?;
    Ok(Json(session.view()))
}

#[derive(Deserialize)]
pub struct ToneRequest {
    pub tone: Tone,
}

/// PUT /api/v1/sessions/:id/tone
pub async fn handle_set_tone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToneRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.set_tone(req.tone);
    Ok(Json(session.view()))
}

#[derive(Deserialize)]
pub struct UploadQuery {
    /// Run the extracted text through the resume formatter.
    #[serde(default)]
    pub format: bool,
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload with a single `file` field. The session's resume is
/// cleared as soon as processing starts and only refilled on success.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let upload = read_upload(&mut multipart, query.format).await?;

    run_upload(session.clone(), state.llm.clone(), upload).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

async fn read_upload(multipart: &mut Multipart, format: bool) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        return Ok(ResumeUpload {
            file_name,
            content_type,
            data,
            format,
        });
    }
    Err(ExtractionError::MissingFile.into())
}

/// POST /api/v1/sessions/:id/generate
///
/// Also serves "Try Again": every call is a fresh attempt.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    run_generation(session.clone(), state.llm.clone()).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub access_token: String,
}

/// POST /api/v1/sessions/:id/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let resolved = state.identity.resolve(&req.access_token).await;

    let mut session = session.lock().await;
    match resolved {
        Ok(user) => {
            session.sign_in(user).await;
            Ok(Json(session.view()))
        }
        Err(e) => {
            warn!("Error fetching user info: {e}");
            session.sign_in_failed();
            Err(AppError::Unauthorized)
        }
    }
}

/// POST /api/v1/sessions/:id/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.sign_out();
    Ok(Json(session.view()))
}

/// POST /api/v1/sessions/:id/drafts
///
/// Silently does nothing when nobody is signed in or there is no letter.
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.save_draft().await?;
    Ok(Json(session.view()))
}

/// DELETE /api/v1/sessions/:id/drafts/:draft_id
pub async fn handle_delete_draft(
    State(state): State<AppState>,
    Path((id, draft_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.delete_draft(&draft_id).await?;
    Ok(Json(session.view()))
}

/// POST /api/v1/sessions/:id/drafts/:draft_id/load
pub async fn handle_load_draft(
    State(state): State<AppState>,
    Path((id, draft_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.load_draft(&draft_id)?;
    Ok(Json(session.view()))
}

/// GET /api/v1/sessions/:id/export.pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(id).await?;
    let (letter, company) = {
        let session = session.lock().await;
        (session.output().to_string(), session.company_name().to_string())
    };
    if letter.trim().is_empty() {
        return Err(AppError::Validation(NOTHING_TO_EXPORT_MESSAGE.to_string()));
    }

    let filename = export_filename(&company);
    let bytes = tokio::task::spawn_blocking(move || render_cover_letter_pdf(&letter, "Cover Letter"))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF export task failed: {e}")))??;

    info!("Exported {filename} ({} bytes)", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
