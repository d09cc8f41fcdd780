/// Save-file backup and sharing
///
/// Metadata lives in SQLite; the uploaded bytes live on disk under the
/// configured save directory, keyed by save id.

mod manager;

pub use manager::SaveManager;

use serde::{Deserialize, Serialize};

/// Query parameters accepted on save upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSaveParams {
    pub file_name: String,
    pub note: Option<String>,
}
