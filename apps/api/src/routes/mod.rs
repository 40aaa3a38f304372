pub mod health;
pub mod meta;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

/// Resume uploads larger than this are rejected before parsing.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/config", get(meta::handle_public_config))
        .route("/api/v1/modes", get(meta::handle_list_modes))
        .route(
            "/api/v1/theme",
            get(meta::handle_get_theme).put(meta::handle_set_theme),
        )
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/inputs",
            patch(handlers::handle_update_inputs),
        )
        .route("/api/v1/sessions/:id/mode", put(handlers::handle_select_mode))
        .route("/api/v1/sessions/:id/tone", put(handlers::handle_set_tone))
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/sessions/:id/generate",
            post(handlers::handle_generate),
        )
        // Identity
        .route("/api/v1/sessions/:id/sign-in", post(handlers::handle_sign_in))
        .route(
            "/api/v1/sessions/:id/sign-out",
            post(handlers::handle_sign_out),
        )
        // Drafts
        .route(
            "/api/v1/sessions/:id/drafts",
            post(handlers::handle_save_draft),
        )
        .route(
            "/api/v1/sessions/:id/drafts/:draft_id",
            delete(handlers::handle_delete_draft),
        )
        .route(
            "/api/v1/sessions/:id/drafts/:draft_id/load",
            post(handlers::handle_load_draft),
        )
        .route(
            "/api/v1/sessions/:id/export.pdf",
            get(handlers::handle_export_pdf),
        )
        .with_state(state)
}
