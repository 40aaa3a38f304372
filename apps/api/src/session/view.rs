use serde::Serialize;
use uuid::Uuid;

use super::controller::{AttemptState, RequestSummary, Session, UploadStatus};
use crate::generation::generator::GroundingSource;
use crate::generation::mode::{GenerationMode, JobInputKind, URL_MODE_LOCK_NOTICE};
use crate::generation::tone::Tone;
use crate::models::{Draft, User};

/// Everything the frontend renders for one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub resume: String,
    pub job_description: String,
    pub job_url: String,
    pub company_name: String,
    pub job_input_kind: JobInputKind,
    pub selected_mode: GenerationMode,
    pub effective_mode: GenerationMode,
    /// True while a job URL forces search grounding.
    pub mode_locked: bool,
    pub mode_description: &'static str,
    pub tone: Tone,
    pub user: Option<User>,
    pub drafts: Vec<Draft>,
    pub attempt: AttemptState,
    pub output: String,
    pub sources: Vec<GroundingSource>,
    pub error: Option<String>,
    pub upload: Option<UploadStatus>,
    pub last_request: Option<RequestSummary>,
    pub can_generate: bool,
    pub can_save: bool,
}

impl Session {
    pub fn view(&self) -> SessionView {
        let mode_locked = self.job_input_kind == JobInputKind::Url;
        let effective_mode = self.effective_mode();
        let error = match &self.attempt {
            AttemptState::Failed { message } => Some(message.clone()),
            _ => None,
        };

        SessionView {
            id: self.id,
            resume: self.resume.clone(),
            job_description: self.job_description.clone(),
            job_url: self.job_url.clone(),
            company_name: self.company_name.clone(),
            job_input_kind: self.job_input_kind,
            selected_mode: self.selected_mode,
            effective_mode,
            mode_locked,
            mode_description: if mode_locked {
                URL_MODE_LOCK_NOTICE
            } else {
                effective_mode.description()
            },
            tone: self.tone,
            user: self.user.clone(),
            drafts: self.shelf.drafts().to_vec(),
            attempt: self.attempt.clone(),
            output: self.output.clone(),
            sources: self.sources.clone(),
            error,
            upload: self.upload.clone(),
            last_request: self.last_request.clone(),
            can_generate: self.can_generate(),
            can_save: self.can_save(),
        }
    }
}
