use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::mode::GenerationMode;
use crate::generation::tone::Tone;
use crate::models::Theme;
use crate::persistence::{run_blocking, theme::save_theme};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub google_client_id: String,
}

/// GET /api/v1/config
/// Values the frontend needs before it can start the OAuth flow.
pub async fn handle_public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(PublicConfig {
        google_client_id: state.config.google_client_id.clone(),
    })
}

#[derive(Serialize)]
pub struct ModeInfo {
    pub id: GenerationMode,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct ModesResponse {
    pub modes: Vec<ModeInfo>,
    pub tones: Vec<Tone>,
}

/// GET /api/v1/modes
pub async fn handle_list_modes() -> Json<ModesResponse> {
    let modes = GenerationMode::ALL
        .iter()
        .map(|m| ModeInfo {
            id: *m,
            label: m.label(),
            description: m.description(),
        })
        .collect();
    Json(ModesResponse {
        modes,
        tones: Tone::ALL.to_vec(),
    })
}

#[derive(Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

/// GET /api/v1/theme
pub async fn handle_get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(ThemeBody {
        theme: *state.theme.read().await,
    })
}

/// PUT /api/v1/theme
pub async fn handle_set_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    let theme = body.theme;
    let mut current = state.theme.write().await;
    run_blocking(&state.store, move |store| save_theme(store, theme)).await?;
    *current = body.theme;
    info!("Theme set to {}", body.theme.as_str());
    Ok(Json(ThemeBody { theme: body.theme }))
}
