/// Game catalog management

mod manager;

pub use manager::GameManager;

use serde::{Deserialize, Serialize};

/// Fields for creating or updating a game (admin operation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInput {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
}

/// Fields for attaching a download link to a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLinkInput {
    pub label: String,
    pub url: String,
}
