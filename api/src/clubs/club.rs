use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

use crate::error::AppResult;

pub const CLUBS_PER_PAGE: i64 = 50;
pub const RANDOM_CLUBS_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub instagram_url: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
}

impl Club {
    pub async fn from_id(id: i64, db: &mut SqliteConnection) -> AppResult<Option<Self>> {
        let club = sqlx::query_as::<_, Club>(
            r#"
            SELECT id, name, instagram_url, logo_url, description
            FROM clubs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(club)
    }

    /// Up to `limit` clubs, shuffled by the store on every call.
    pub async fn random(limit: i64, db: &mut SqliteConnection) -> AppResult<Vec<Self>> {
        let clubs = sqlx::query_as::<_, Club>(
            r#"
            SELECT id, name, instagram_url, logo_url, description
            FROM clubs
            ORDER BY RANDOM()
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(clubs)
    }

    pub async fn random_id(db: &mut SqliteConnection) -> AppResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM clubs ORDER BY RANDOM() LIMIT 1")
            .fetch_optional(db)
            .await?;

        Ok(id)
    }

    /// One alphabetical page; `page` is 1-based and must already be positive.
    pub async fn page(page: i64, per_page: i64, db: &mut SqliteConnection) -> AppResult<Vec<Self>> {
        let offset = (page - 1).saturating_mul(per_page);
        let clubs = sqlx::query_as::<_, Club>(
            r#"
            SELECT id, name, instagram_url, logo_url, description
            FROM clubs
            ORDER BY name COLLATE NOCASE ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(clubs)
    }

    /// Case-insensitive substring match on `name`, folded with Unicode lowercase rules
    /// (SQLite `LIKE` only folds ASCII). A blank query matches nothing.
    pub async fn search(query: &str, db: &mut SqliteConnection) -> AppResult<Vec<Self>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let clubs = sqlx::query_as::<_, Club>(
            r#"
            SELECT id, name, instagram_url, logo_url, description
            FROM clubs
            ORDER BY name COLLATE NOCASE ASC, id ASC
            "#,
        )
        .fetch_all(db)
        .await?
        .into_iter()
        .filter(|club| club.name.to_lowercase().contains(&needle))
        .collect();

        Ok(clubs)
    }
}

#[cfg(test)]
impl Club {
    /// Insert-or-replace by id, the way the ingestion pipeline loads clubs.
    pub async fn upsert(&self, db: &mut SqliteConnection) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clubs (id, name, instagram_url, logo_url, description)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                instagram_url = excluded.instagram_url,
                logo_url = excluded.logo_url,
                description = excluded.description
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.instagram_url)
        .bind(&self.logo_url)
        .bind(&self.description)
        .execute(db)
        .await?;

        Ok(())
    }

    pub async fn delete(id: i64, db: &mut SqliteConnection) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clubs WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
