use serde::{Deserialize, Serialize};

/// A signed-in user. `id` doubles as the persistence namespace for drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}
