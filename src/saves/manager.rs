/// Save-file storage service
use crate::{
    db::models::SaveFile,
    error::{VaultError, VaultResult},
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::path::PathBuf;
use uuid::Uuid;

/// Save-file manager
#[derive(Clone)]
pub struct SaveManager {
    db: SqlitePool,
    save_directory: PathBuf,
    upload_limit: usize,
}

impl SaveManager {
    pub fn new(db: SqlitePool, save_directory: PathBuf, upload_limit: usize) -> Self {
        Self {
            db,
            save_directory,
            upload_limit,
        }
    }

    /// Store an uploaded save: bytes to disk, metadata to the database
    pub async fn upload(
        &self,
        game_id: &str,
        owner_id: &str,
        file_name: &str,
        note: Option<String>,
        data: &[u8],
    ) -> VaultResult<SaveFile> {
        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return Err(VaultError::Validation("Invalid file name".to_string()));
        }

        if data.is_empty() {
            return Err(VaultError::Validation("Save file is empty".to_string()));
        }

        if data.len() > self.upload_limit {
            return Err(VaultError::Validation(format!(
                "Save file exceeds upload limit of {} bytes",
                self.upload_limit
            )));
        }

        let id = Uuid::new_v4().to_string();
        let sha256 = hex::encode(Sha256::digest(data));
        let now = Utc::now();

        tokio::fs::create_dir_all(&self.save_directory).await?;
        tokio::fs::write(self.blob_path(&id), data).await?;

        sqlx::query(
            "INSERT INTO save_file (id, game_id, owner_id, file_name, size_bytes, sha256, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&id)
        .bind(game_id)
        .bind(owner_id)
        .bind(file_name)
        .bind(data.len() as i64)
        .bind(&sha256)
        .bind(&note)
        .bind(now)
        .execute(&self.db)
        .await?;

        tracing::info!(save_id = %id, game_id, owner_id, size = data.len(), "Stored save file");

        Ok(SaveFile {
            id,
            game_id: game_id.to_string(),
            owner_id: owner_id.to_string(),
            file_name: file_name.to_string(),
            size_bytes: data.len() as i64,
            sha256,
            note,
            created_at: now,
        })
    }

    /// Get save metadata by id
    pub async fn get(&self, id: &str) -> VaultResult<SaveFile> {
        sqlx::query_as::<_, SaveFile>(
            "SELECT id, game_id, owner_id, file_name, size_bytes, sha256, note, created_at
             FROM save_file WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(VaultError::Database)?
        .ok_or_else(|| VaultError::NotFound("Save file not found".to_string()))
    }

    /// Read the stored bytes for a save
    pub async fn download(&self, id: &str) -> VaultResult<(SaveFile, Vec<u8>)> {
        let save = self.get(id).await?;
        let data = tokio::fs::read(self.blob_path(&save.id)).await.map_err(|_| {
            VaultError::Internal(format!("Save blob missing for {}", save.id))
        })?;

        Ok((save, data))
    }

    /// List saves shared under a game, newest first
    pub async fn list_by_game(&self, game_id: &str) -> VaultResult<Vec<SaveFile>> {
        let saves = sqlx::query_as::<_, SaveFile>(
            "SELECT id, game_id, owner_id, file_name, size_bytes, sha256, note, created_at
             FROM save_file WHERE game_id = ?1 ORDER BY created_at DESC",
        )
        .bind(game_id)
        .fetch_all(&self.db)
        .await?;

        Ok(saves)
    }

    /// Delete a save; only its owner may do this
    pub async fn delete(&self, id: &str, requester_id: &str) -> VaultResult<()> {
        let save = self.get(id).await?;

        if save.owner_id != requester_id {
            return Err(VaultError::Authorization(
                "Only the owner can delete a save".to_string(),
            ));
        }

        sqlx::query("DELETE FROM save_file WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        // Blob removal failure is not fatal; the row is authoritative
        if let Err(e) = tokio::fs::remove_file(self.blob_path(id)).await {
            tracing::warn!(save_id = %id, "Failed to remove save blob: {}", e);
        }

        Ok(())
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.save_directory.join(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    async fn setup_manager() -> (SaveManager, TempDir) {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&db).await.unwrap();

        // Parent rows for the saves the tests record
        let now = Utc::now();
        for game_id in ["game-1", "g"] {
            sqlx::query(
                "INSERT INTO game (id, title, slug, created_at, updated_at)
                 VALUES (?1, ?2, ?1, ?3, ?3)",
            )
            .bind(game_id)
            .bind("Test Game")
            .bind(now)
            .execute(&db)
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO user (id, username, password_hash, created_at)
             VALUES ('u1', 'u1', 'x', ?1)",
        )
        .bind(now)
        .execute(&db)
        .await
        .unwrap();

        let dir = TempDir::new().unwrap();
        let manager = SaveManager::new(db, dir.path().to_path_buf(), 1024);
        (manager, dir)
    }

    #[tokio::test]
    async fn test_upload_and_download_roundtrip() {
        let (manager, _dir) = setup_manager().await;
        let data = b"SAVEDATA-v1";

        let save = manager
            .upload("game-1", "u1", "slot1.sav", Some("endgame".to_string()), data)
            .await
            .unwrap();

        assert_eq!(save.size_bytes, data.len() as i64);
        assert_eq!(save.sha256, hex::encode(Sha256::digest(data)));

        let (meta, bytes) = manager.download(&save.id).await.unwrap();
        assert_eq!(meta.file_name, "slot1.sav");
        assert_eq!(bytes, data);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_names_and_sizes() {
        let (manager, _dir) = setup_manager().await;

        assert!(manager.upload("g", "u1", "", None, b"x").await.is_err());
        assert!(manager
            .upload("g", "u1", "../escape.sav", None, b"x")
            .await
            .is_err());
        assert!(manager.upload("g", "u1", "a.sav", None, b"").await.is_err());

        let too_big = vec![0u8; 2048];
        assert!(manager.upload("g", "u1", "a.sav", None, &too_big).await.is_err());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (manager, _dir) = setup_manager().await;

        manager.upload("g", "u1", "old.sav", None, b"1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.upload("g", "u1", "new.sav", None, b"2").await.unwrap();

        let saves = manager.list_by_game("g").await.unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].file_name, "new.sav");
    }

    #[tokio::test]
    async fn test_delete_owner_only() {
        let (manager, _dir) = setup_manager().await;

        let save = manager.upload("g", "u1", "a.sav", None, b"x").await.unwrap();

        assert!(matches!(
            manager.delete(&save.id, "u2").await,
            Err(VaultError::Authorization(_))
        ));

        manager.delete(&save.id, "u1").await.unwrap();
        assert!(matches!(
            manager.get(&save.id).await,
            Err(VaultError::NotFound(_))
        ));
    }
}
