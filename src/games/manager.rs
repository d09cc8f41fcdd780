/// Game and download-link CRUD
use crate::{
    db::models::{DownloadLink, Game},
    error::{VaultError, VaultResult},
    games::{DownloadLinkInput, GameInput},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Game catalog service
#[derive(Clone)]
pub struct GameManager {
    db: SqlitePool,
}

impl GameManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new game
    pub async fn create_game(&self, input: GameInput) -> VaultResult<Game> {
        Self::validate_input(&input)?;

        if self.slug_exists(&input.slug).await? {
            return Err(VaultError::Conflict(format!(
                "Slug {} already taken",
                input.slug
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO game (id, title, slug, description, cover_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.cover_url)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        tracing::info!(game_id = %id, slug = %input.slug, "Created game");

        Ok(Game {
            id,
            title: input.title,
            slug: input.slug,
            description: input.description,
            cover_url: input.cover_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Update an existing game
    pub async fn update_game(&self, id: &str, input: GameInput) -> VaultResult<Game> {
        Self::validate_input(&input)?;

        let existing = self.get_game(id).await?;

        if input.slug != existing.slug && self.slug_exists(&input.slug).await? {
            return Err(VaultError::Conflict(format!(
                "Slug {} already taken",
                input.slug
            )));
        }

        let now = Utc::now();
        sqlx::query(
            "UPDATE game SET title = ?1, slug = ?2, description = ?3, cover_url = ?4, updated_at = ?5
             WHERE id = ?6",
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.cover_url)
        .bind(now)
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_game(id).await
    }

    /// Delete a game and everything attached to it
    pub async fn delete_game(&self, id: &str) -> VaultResult<()> {
        let result = sqlx::query("DELETE FROM game WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VaultError::NotFound("Game not found".to_string()));
        }

        tracing::info!(game_id = %id, "Deleted game");

        Ok(())
    }

    /// Get a game by id
    pub async fn get_game(&self, id: &str) -> VaultResult<Game> {
        sqlx::query_as::<_, Game>(
            "SELECT id, title, slug, description, cover_url, created_at, updated_at
             FROM game WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(VaultError::Database)?
        .ok_or_else(|| VaultError::NotFound("Game not found".to_string()))
    }

    /// List all games ordered by title
    pub async fn list_games(&self) -> VaultResult<Vec<Game>> {
        let games = sqlx::query_as::<_, Game>(
            "SELECT id, title, slug, description, cover_url, created_at, updated_at
             FROM game ORDER BY title",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(games)
    }

    /// Attach a download link to a game
    pub async fn add_link(&self, game_id: &str, input: DownloadLinkInput) -> VaultResult<DownloadLink> {
        if input.label.is_empty() || input.url.is_empty() {
            return Err(VaultError::Validation(
                "Link label and url cannot be empty".to_string(),
            ));
        }

        // Ensure the game exists before attaching
        self.get_game(game_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO download_link (id, game_id, label, url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(game_id)
        .bind(&input.label)
        .bind(&input.url)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(DownloadLink {
            id,
            game_id: game_id.to_string(),
            label: input.label,
            url: input.url,
            created_at: now,
        })
    }

    /// Remove a download link
    pub async fn remove_link(&self, link_id: &str) -> VaultResult<()> {
        let result = sqlx::query("DELETE FROM download_link WHERE id = ?1")
            .bind(link_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VaultError::NotFound("Download link not found".to_string()));
        }

        Ok(())
    }

    /// List download links for a game, in creation order
    pub async fn list_links(&self, game_id: &str) -> VaultResult<Vec<DownloadLink>> {
        let links = sqlx::query_as::<_, DownloadLink>(
            "SELECT id, game_id, label, url, created_at
             FROM download_link WHERE game_id = ?1 ORDER BY created_at",
        )
        .bind(game_id)
        .fetch_all(&self.db)
        .await?;

        Ok(links)
    }

    async fn slug_exists(&self, slug: &str) -> VaultResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM game WHERE slug = ?1")
            .bind(slug)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    fn validate_input(input: &GameInput) -> VaultResult<()> {
        if input.title.is_empty() {
            return Err(VaultError::Validation("Title cannot be empty".to_string()));
        }

        if input.slug.is_empty() || input.slug.len() > 100 {
            return Err(VaultError::Validation("Invalid slug".to_string()));
        }

        if !input
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(VaultError::Validation(
                "Slug may only contain lowercase letters, digits and hyphens".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_manager() -> GameManager {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&db).await.unwrap();
        GameManager::new(db)
    }

    fn game_input(slug: &str) -> GameInput {
        GameInput {
            title: "Stardew Valley".to_string(),
            slug: slug.to_string(),
            description: Some("Farming sim".to_string()),
            cover_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_games() {
        let manager = setup_manager().await;

        manager.create_game(game_input("stardew-valley")).await.unwrap();
        manager
            .create_game(GameInput {
                title: "Hades".to_string(),
                slug: "hades".to_string(),
                description: None,
                cover_url: None,
            })
            .await
            .unwrap();

        let games = manager.list_games().await.unwrap();
        assert_eq!(games.len(), 2);
        // Ordered by title
        assert_eq!(games[0].title, "Hades");
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflict() {
        let manager = setup_manager().await;

        manager.create_game(game_input("stardew-valley")).await.unwrap();
        let result = manager.create_game(game_input("stardew-valley")).await;

        assert!(matches!(result, Err(VaultError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let manager = setup_manager().await;

        assert!(manager.create_game(game_input("Bad Slug!")).await.is_err());
        assert!(manager.create_game(game_input("")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_game() {
        let manager = setup_manager().await;
        let game = manager.create_game(game_input("stardew-valley")).await.unwrap();

        let updated = manager
            .update_game(
                &game.id,
                GameInput {
                    title: "Stardew Valley (GOTY)".to_string(),
                    slug: "stardew-valley".to_string(),
                    description: None,
                    cover_url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Stardew Valley (GOTY)");
        assert!(updated.description.is_none());
    }

    #[tokio::test]
    async fn test_links_roundtrip() {
        let manager = setup_manager().await;
        let game = manager.create_game(game_input("stardew-valley")).await.unwrap();

        let link = manager
            .add_link(
                &game.id,
                DownloadLinkInput {
                    label: "Windows installer".to_string(),
                    url: "https://dl.example/stardew.exe".to_string(),
                },
            )
            .await
            .unwrap();

        let links = manager.list_links(&game.id).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, link.id);

        manager.remove_link(&link.id).await.unwrap();
        assert!(manager.list_links(&game.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_link_requires_existing_game() {
        let manager = setup_manager().await;

        let result = manager
            .add_link(
                "no-such-game",
                DownloadLinkInput {
                    label: "x".to_string(),
                    url: "https://dl.example/x".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }
}
