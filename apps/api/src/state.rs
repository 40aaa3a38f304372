use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::llm_client::LanguageModel;
use crate::models::Theme;
use crate::persistence::KeyValueStore;
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Production: `GeminiClient`.
    pub llm: Arc<dyn LanguageModel>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Backing store for drafts and the theme preference.
    pub store: Arc<dyn KeyValueStore>,
    pub sessions: SessionRegistry,
    /// Current theme, loaded from `store` at startup and written through on change.
    pub theme: Arc<RwLock<Theme>>,
    pub config: Config,
}
