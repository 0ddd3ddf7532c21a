mod review;

pub use review::*;

use axum::{debug_handler, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db_connection::DbConnection;
use crate::error::AppResult;
use crate::extract::{ClubId, ValidJson};
use crate::AppState;

/// Request body for a new review. Both fields are optional here so that a missing one
/// is reported as a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateReviewParams {
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_reviews(
    ClubId(club_id): ClubId,
    DbConnection(mut db): DbConnection,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = Review::for_club(club_id, &mut db).await?;
    Ok(Json(reviews))
}

#[debug_handler]
#[tracing::instrument(skip(state))]
pub async fn add_review(
    State(state): State<AppState>,
    ClubId(club_id): ClubId,
    ValidJson(params): ValidJson<CreateReviewParams>,
) -> AppResult<impl IntoResponse> {
    let review = NewReview::new(params.rating, params.comment)?;

    let DbConnection(mut db) = DbConnection::acquire(&state.db).await?;
    let review_id = review.insert(club_id, &mut db).await?;
    tracing::info!(club_id, review_id, "Review added");

    Ok((StatusCode::CREATED, Json(json!({ "status": "success" }))))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_average_rating(
    ClubId(club_id): ClubId,
    DbConnection(mut db): DbConnection,
) -> AppResult<Json<RatingSummary>> {
    let summary = RatingSummary::for_club(club_id, &mut db).await?;
    Ok(Json(summary))
}
