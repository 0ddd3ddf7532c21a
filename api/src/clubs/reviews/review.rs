use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub rating: i64,
    pub comment: String,
    #[serde(with = "store_datetime")]
    pub date_created: NaiveDateTime,
}

/// `date_created` travels in the same `YYYY-MM-DD HH:MM:SS` text SQLite stores.
mod store_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

impl Review {
    /// Newest first. Reviews written within the same second fall back to insertion order.
    pub async fn for_club(club_id: i64, db: &mut SqliteConnection) -> AppResult<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT rating, comment, date_created
            FROM reviews
            WHERE club_id = ?
            ORDER BY date_created DESC, review_id DESC
            "#,
        )
        .bind(club_id)
        .fetch_all(db)
        .await?;

        Ok(reviews)
    }
}

/// A review that has passed validation and only needs a club to attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: i64,
    pub comment: String,
}

impl NewReview {
    pub fn new(rating: Option<i64>, comment: Option<String>) -> AppResult<Self> {
        let (Some(rating), Some(comment)) = (rating, comment) else {
            return Err(AppError::Validation("Missing rating or comment".to_string()));
        };

        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        if comment.trim().is_empty() {
            return Err(AppError::Validation("Missing rating or comment".to_string()));
        }

        Ok(Self { rating, comment })
    }

    pub async fn insert(&self, club_id: i64, db: &mut SqliteConnection) -> AppResult<i64> {
        let review_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (club_id, rating, comment)
            VALUES (?, ?, ?)
            RETURNING review_id
            "#,
        )
        .bind(club_id)
        .bind(self.rating)
        .bind(&self.comment)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::ReferentialIntegrity("Club ID does not exist".to_string())
            }
            e => AppError::Store(e),
        })?;

        Ok(review_id)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub total_reviews: i64,
}

impl RatingSummary {
    pub async fn for_club(club_id: i64, db: &mut SqliteConnection) -> AppResult<Self> {
        let (average, total_reviews) = sqlx::query_as::<_, (Option<f64>, i64)>(
            r#"
            SELECT AVG(rating), COUNT(*)
            FROM reviews
            WHERE club_id = ?
            "#,
        )
        .bind(club_id)
        .fetch_one(db)
        .await?;

        Ok(Self {
            average: average.map(round_to_tenth).unwrap_or(0.0),
            total_reviews,
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
