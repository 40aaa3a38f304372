//! Per-session application state and the generation attempt state machine.
//!
//! `Idle → Pending → {Succeeded, Failed}`. Validation happens on the way into
//! `Pending`; a failed validation leaves the previous attempt, its output and
//! its sources exactly as they were. A new attempt is always allowed from
//! `Succeeded` or `Failed`, never from `Pending`.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::registry::SharedSession;
use crate::errors::AppError;
use crate::extraction::{extract_resume_text, ExtractionError, ResumeFormat};
use crate::generation::formatter::format_resume_text;
use crate::generation::generator::{
    generate_cover_letter, GenerationResult, GroundingSource, SERVICE_FAILURE_MESSAGE,
};
use crate::generation::mode::{
    effective_mode, GenerationMode, JobInput, JobInputKind, URL_MODE_LOCK_NOTICE,
};
use crate::generation::resolver::{resolve_request, Feature, GenerationRequest};
use crate::generation::tone::Tone;
use crate::llm_client::LanguageModel;
use crate::models::{Draft, User};
use crate::persistence::{DraftShelf, KeyValueStore};

pub const MISSING_RESUME_MESSAGE: &str = "Please provide your resume.";
pub const MISSING_JOB_DESCRIPTION_MESSAGE: &str = "Please provide the job description.";
pub const MISSING_JOB_URL_MESSAGE: &str = "Please provide the job posting URL.";
pub const GENERATION_IN_FLIGHT_MESSAGE: &str = "A cover letter is already being generated.";
pub const UPLOAD_IN_FLIGHT_MESSAGE: &str = "A resume file is already being processed.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AttemptState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed { message: String },
}

/// Outcome of the most recent resume upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum UploadStatus {
    Parsing { file_name: String },
    Parsed { file_name: String, notice: Option<String> },
    Failed { message: String },
}

/// Partial update of the free-form inputs. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputsPatch {
    pub resume: Option<String>,
    pub job_description: Option<String>,
    pub job_url: Option<String>,
    pub company_name: Option<String>,
    pub job_input_kind: Option<JobInputKind>,
}

/// What the last attempt was sent with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub model: &'static str,
    pub features: Vec<Feature>,
}

impl From<&GenerationRequest> for RequestSummary {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            model: request.model_id(),
            features: request.features().to_vec(),
        }
    }
}

pub struct Session {
    pub(super) id: Uuid,
    pub(super) resume: String,
    pub(super) job_description: String,
    pub(super) job_url: String,
    pub(super) company_name: String,
    pub(super) job_input_kind: JobInputKind,
    /// What the user picked. The effective mode may differ while a URL is active.
    pub(super) selected_mode: GenerationMode,
    pub(super) tone: Tone,
    pub(super) user: Option<User>,
    pub(super) shelf: DraftShelf,
    pub(super) attempt: AttemptState,
    pub(super) output: String,
    pub(super) sources: Vec<GroundingSource>,
    pub(super) last_request: Option<RequestSummary>,
    pub(super) upload: Option<UploadStatus>,
}

impl Session {
    pub fn new(id: Uuid, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            id,
            resume: String::new(),
            job_description: String::new(),
            job_url: String::new(),
            company_name: String::new(),
            job_input_kind: JobInputKind::default(),
            selected_mode: GenerationMode::default(),
            tone: Tone::default(),
            user: None,
            shelf: DraftShelf::new(store),
            attempt: AttemptState::Idle,
            output: String::new(),
            sources: Vec::new(),
            last_request: None,
            upload: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attempt(&self) -> &AttemptState {
        &self.attempt
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn drafts(&self) -> &[Draft] {
        self.shelf.drafts()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.upload, Some(UploadStatus::Parsing { .. }))
    }

    pub fn effective_mode(&self) -> GenerationMode {
        effective_mode(self.job_input_kind, self.selected_mode)
    }

    /// The job input currently in play.
    pub fn job_input(&self) -> JobInput<'_> {
        match self.job_input_kind {
            JobInputKind::Text => JobInput::Text(&self.job_description),
            JobInputKind::Url => JobInput::Url(&self.job_url),
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────────────

    pub fn update_inputs(&mut self, patch: InputsPatch) {
        if let Some(resume) = patch.resume {
            self.resume = resume;
            // A manual edit supersedes whatever the last upload reported.
            if !self.is_uploading() {
                self.upload = None;
            }
        }
        if let Some(description) = patch.job_description {
            self.job_description = description;
        }
        if let Some(url) = patch.job_url {
            self.job_url = url;
        }
        if let Some(company) = patch.company_name {
            self.company_name = company;
        }
        if let Some(kind) = patch.job_input_kind {
            self.job_input_kind = kind;
        }
    }

    /// Rejected while a job URL is active: the mode is locked to search grounding.
    pub fn select_mode(&mut self, mode: GenerationMode) -> Result<(), AppError> {
        if self.job_input_kind == JobInputKind::Url {
            return Err(AppError::Validation(URL_MODE_LOCK_NOTICE.to_string()));
        }
        self.selected_mode = mode;
        Ok(())
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    // ── Generation ──────────────────────────────────────────────────────────

    pub fn validate(&self) -> Result<(), AppError> {
        if self.resume.trim().is_empty() {
            return Err(AppError::Validation(MISSING_RESUME_MESSAGE.to_string()));
        }
        match self.job_input() {
            JobInput::Text(v) if v.trim().is_empty() => Err(AppError::Validation(
                MISSING_JOB_DESCRIPTION_MESSAGE.to_string(),
            )),
            JobInput::Url(v) if v.trim().is_empty() => {
                Err(AppError::Validation(MISSING_JOB_URL_MESSAGE.to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn can_generate(&self) -> bool {
        self.attempt != AttemptState::Pending && !self.is_uploading() && self.validate().is_ok()
    }

    /// Validates and enters `Pending`, returning the request to send.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, AppError> {
        if self.attempt == AttemptState::Pending {
            return Err(AppError::Conflict(GENERATION_IN_FLIGHT_MESSAGE.to_string()));
        }
        self.validate()?;

        let request = resolve_request(self.job_input(), self.selected_mode, self.tone, &self.resume);

        self.output.clear();
        self.sources.clear();
        self.last_request = Some(RequestSummary::from(&request));
        self.attempt = AttemptState::Pending;
        Ok(request)
    }

    /// Leaves `Pending`. Output and sources are only stored on success.
    pub fn finish_generation(&mut self, outcome: &Result<GenerationResult, AppError>) {
        match outcome {
            Ok(result) => {
                self.output = result.text.clone();
                self.sources = result.sources.clone();
                self.attempt = AttemptState::Succeeded;
            }
            Err(e) => {
                self.output.clear();
                self.sources.clear();
                self.attempt = AttemptState::Failed {
                    message: e.user_message(),
                };
            }
        }
    }

    // ── Upload ──────────────────────────────────────────────────────────────

    /// Starts processing an uploaded file. The current resume is cleared so a
    /// failed upload never leaves stale text behind.
    pub fn begin_upload(&mut self, file_name: &str) -> Result<(), AppError> {
        if self.is_uploading() {
            return Err(AppError::Conflict(UPLOAD_IN_FLIGHT_MESSAGE.to_string()));
        }
        self.resume.clear();
        self.upload = Some(UploadStatus::Parsing {
            file_name: file_name.to_string(),
        });
        Ok(())
    }

    /// `Ok((text, notice))` stores the text as the resume; errors leave it empty.
    pub fn finish_upload(&mut self, outcome: Result<(String, Option<String>), &ExtractionError>) {
        let file_name = match self.upload.take() {
            Some(UploadStatus::Parsing { file_name }) => file_name,
            _ => String::new(),
        };
        self.upload = Some(match outcome {
            Ok((text, notice)) => {
                self.resume = text;
                UploadStatus::Parsed { file_name, notice }
            }
            Err(e) => UploadStatus::Failed {
                message: e.to_string(),
            },
        });
    }

    // ── Identity ────────────────────────────────────────────────────────────

    pub async fn sign_in(&mut self, user: User) {
        info!("Session {} signed in as {}", self.id, user.id);
        self.shelf.load_drafts_for_user(Some(&user)).await;
        self.user = Some(user);
    }

    /// A failed sign-in leaves nobody signed in.
    pub fn sign_in_failed(&mut self) {
        warn!("Sign-in failed for session {}", self.id);
        self.sign_out();
    }

    /// Clears the user and the in-memory drafts. Storage is untouched.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.shelf.clear();
    }

    // ── Drafts ──────────────────────────────────────────────────────────────

    /// Saves the current output. `Ok(None)` when nobody is signed in or
    /// there is nothing to save.
    pub async fn save_draft(&mut self) -> Result<Option<Draft>, AppError> {
        if self.attempt == AttemptState::Pending {
            return Ok(None);
        }
        Ok(self
            .shelf
            .save_draft(self.user.as_ref(), &self.company_name, &self.output)
            .await?)
    }

    pub async fn delete_draft(&mut self, draft_id: &str) -> Result<bool, AppError> {
        Ok(self
            .shelf
            .delete_draft(self.user.as_ref(), draft_id)
            .await?)
    }

    /// Puts a saved draft back into the output area along with its company name.
    pub fn load_draft(&mut self, draft_id: &str) -> Result<(), AppError> {
        if self.attempt == AttemptState::Pending {
            return Err(AppError::Conflict(GENERATION_IN_FLIGHT_MESSAGE.to_string()));
        }
        let draft = self
            .shelf
            .find(draft_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Draft {draft_id} not found")))?;

        self.output = draft.cover_letter;
        self.company_name = draft.company_name;
        self.sources.clear();
        self.attempt = AttemptState::Succeeded;
        Ok(())
    }

    pub fn can_save(&self) -> bool {
        self.user.is_some() && !self.output.is_empty() && self.attempt != AttemptState::Pending
    }
}

/// One full generation attempt against a shared session.
///
/// The lock is released while the model call is in flight; anyone arriving in
/// the meantime sees `Pending` and gets a conflict rather than a second call.
/// The call runs on its own task, so the attempt always reaches `Succeeded` or
/// `Failed` even when the caller goes away.
pub async fn run_generation(
    session: SharedSession,
    llm: Arc<dyn LanguageModel>,
) -> Result<GenerationResult, AppError> {
    let request = session.lock().await.begin_generation()?;

    let attempt_session = Arc::clone(&session);
    let attempt = tokio::spawn(async move {
        let outcome = generate_cover_letter(llm.as_ref(), &request).await;
        attempt_session.lock().await.finish_generation(&outcome);
        outcome
    });

    match attempt.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Generation task for session {} aborted: {e}", session.lock().await.id);
            let failed = Err(AppError::GenerationFailed(SERVICE_FAILURE_MESSAGE.to_string()));
            session.lock().await.finish_generation(&failed);
            failed
        }
    }
}

/// An uploaded resume file, as received.
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
    /// Run the extracted text through the resume formatter.
    pub format: bool,
}

/// Extracts (and optionally formats) an uploaded resume into the session.
///
/// Like `run_generation`, the work runs on its own task so the session always
/// leaves the parsing state.
pub async fn run_upload(
    session: SharedSession,
    llm: Arc<dyn LanguageModel>,
    upload: ResumeUpload,
) -> Result<(), AppError> {
    let file_name = upload
        .file_name
        .clone()
        .unwrap_or_else(|| "resume".to_string());
    session.lock().await.begin_upload(&file_name)?;
    info!(
        "Processing resume upload {file_name} ({} bytes, format={})",
        upload.data.len(),
        upload.format
    );

    let upload_session = Arc::clone(&session);
    let task = tokio::spawn(async move {
        let outcome = process_upload(llm.as_ref(), upload).await;
        let mut session = upload_session.lock().await;
        match outcome {
            Ok(parsed) => {
                session.finish_upload(Ok(parsed));
                Ok(())
            }
            Err(e) => {
                warn!("Resume upload {file_name} failed: {e}");
                session.finish_upload(Err(&e));
                Err(e)
            }
        }
    });

    match task.await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => {
            let failed = ExtractionError::Parse(format!("upload task aborted: {e}"));
            session.lock().await.finish_upload(Err(&failed));
            Err(failed.into())
        }
    }
}

async fn process_upload(
    llm: &dyn LanguageModel,
    upload: ResumeUpload,
) -> Result<(String, Option<String>), ExtractionError> {
    let kind = ResumeFormat::detect(upload.content_type.as_deref(), upload.file_name.as_deref())?;
    let raw = extract_resume_text(kind, upload.data).await?;
    if !upload.format {
        return Ok((raw, None));
    }
    let formatted = format_resume_text(llm, &raw).await;
    Ok((formatted.text, formatted.notice))
}
