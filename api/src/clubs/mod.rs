mod club;
pub mod reviews;

pub use club::*;

use axum::{debug_handler, extract::State, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use serde_with::{serde_as, NoneAsEmptyString};

use crate::db_connection::DbConnection;
use crate::error::{AppError, AppResult};
use crate::extract::{ClubId, ValidQuery};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/clubs", get(get_clubs_page))
        .route("/clubs/random", get(get_random_clubs))
        .route("/clubs/random-id", get(get_random_club_id))
        .route("/clubs/search", get(search_clubs))
        .route("/clubs/{id}", get(get_club_by_id))
        .route(
            "/clubs/{id}/reviews",
            get(reviews::get_reviews).post(reviews::add_review),
        )
        .route("/clubs/{id}/average-rating", get(reviews::get_average_rating))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_club_by_id(
    ClubId(id): ClubId,
    DbConnection(mut db): DbConnection,
) -> AppResult<Json<Club>> {
    Club::from_id(id, &mut db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Club not found".to_string()))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_random_clubs(DbConnection(mut db): DbConnection) -> AppResult<Json<Vec<Club>>> {
    let clubs = Club::random(RANDOM_CLUBS_LIMIT, &mut db).await?;
    Ok(Json(clubs))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_random_club_id(DbConnection(mut db): DbConnection) -> AppResult<Json<Value>> {
    match Club::random_id(&mut db).await? {
        Some(id) => Ok(Json(json!({ "id": id }))),
        None => Err(AppError::NotFound("No clubs found".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    page: Option<i64>,
}

#[debug_handler]
#[tracing::instrument(skip(state))]
pub async fn get_clubs_page(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<Vec<Club>>> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("Page must be 1 or greater".to_string()));
    }

    let DbConnection(mut db) = DbConnection::acquire(&state.db).await?;
    let clubs = Club::page(page, CLUBS_PER_PAGE, &mut db).await?;
    Ok(Json(clubs))
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    q: Option<String>,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn search_clubs(
    ValidQuery(params): ValidQuery<SearchParams>,
    DbConnection(mut db): DbConnection,
) -> AppResult<Json<Vec<Club>>> {
    let Some(query) = params.q else {
        return Ok(Json(Vec::new()));
    };

    let clubs = Club::search(&query, &mut db).await?;
    Ok(Json(clubs))
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::tests::create_test_server;
    use axum::http::StatusCode;
    use sqlx::SqlitePool;
    use std::collections::HashSet;

    pub fn club(id: i64, name: &str) -> Club {
        Club {
            id,
            name: name.to_string(),
            instagram_url: Some(format!("https://www.instagram.com/club{id}")),
            logo_url: Some(format!("https://example.org/logos/{id}.png")),
            description: Some(format!("{name} description")),
        }
    }

    pub async fn seed_clubs(db: &SqlitePool, clubs: &[(i64, &str)]) {
        let mut conn = db.acquire().await.unwrap();
        for (id, name) in clubs {
            club(*id, name).upsert(&mut conn).await.unwrap();
        }
    }

    pub async fn seed_numbered_clubs(db: &SqlitePool, count: i64) {
        let mut conn = db.acquire().await.unwrap();
        for i in 1..=count {
            club(i, &format!("Club {:03}", i))
                .upsert(&mut conn)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_get_club_by_id() {
        let (server, db) = create_test_server().await;
        seed_clubs(&db, &[(42, "Chess Club")]).await;

        let response = server.get("/clubs/42").await;
        response.assert_status_ok();
        let found: Club = response.json();
        assert_eq!(found, club(42, "Chess Club"));

        let body: Value = response.json();
        for key in ["id", "name", "instagram_url", "logo_url", "description"] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_get_missing_club() {
        let (server, _db) = create_test_server().await;

        let response = server.get("/clubs/7").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>(), json!({ "error": "Club not found" }));

        let response = server.get("/clubs/not-a-number").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_club_with_null_fields() {
        let (server, db) = create_test_server().await;
        let mut conn = db.acquire().await.unwrap();
        Club {
            id: 3,
            name: "Bare Club".to_string(),
            instagram_url: None,
            logo_url: None,
            description: None,
        }
        .upsert(&mut conn)
        .await
        .unwrap();
        drop(conn);

        let response = server.get("/clubs/3").await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({
                "id": 3,
                "name": "Bare Club",
                "instagram_url": null,
                "logo_url": null,
                "description": null,
            })
        );
    }

    #[tokio::test]
    async fn test_random_clubs() {
        let (server, db) = create_test_server().await;

        let response = server.get("/clubs/random").await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Club>>().is_empty());

        seed_numbered_clubs(&db, 75).await;

        let response = server.get("/clubs/random").await;
        response.assert_status_ok();
        let clubs: Vec<Club> = response.json();
        assert_eq!(clubs.len(), 50);
        let ids: HashSet<_> = clubs.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| (1..=75).contains(id)));
    }

    #[tokio::test]
    async fn test_random_club_id() {
        let (server, db) = create_test_server().await;

        let response = server.get("/clubs/random-id").await;
        response.assert_status(StatusCode::NOT_FOUND);

        seed_clubs(&db, &[(5, "Chess Club"), (9, "Go Club")]).await;

        let response = server.get("/clubs/random-id").await;
        response.assert_status_ok();
        let id = response.json::<Value>()["id"].as_i64().unwrap();
        assert!([5, 9].contains(&id));
    }

    #[tokio::test]
    async fn test_clubs_page() {
        let (server, db) = create_test_server().await;
        seed_numbered_clubs(&db, 120).await;

        let response = server.get("/clubs").await;
        response.assert_status_ok();
        let first: Vec<Club> = response.json();
        assert_eq!(first.len(), 50);
        assert_eq!(first[0].name, "Club 001");

        let response = server.get("/clubs").add_query_param("page", 2).await;
        response.assert_status_ok();
        let second: Vec<Club> = response.json();
        let names: Vec<_> = second.iter().map(|c| c.name.clone()).collect();
        let expected: Vec<_> = (51..=100).map(|i| format!("Club {:03}", i)).collect();
        assert_eq!(names, expected);

        let response = server.get("/clubs").add_query_param("page", 3).await;
        assert_eq!(response.json::<Vec<Club>>().len(), 20);

        let response = server.get("/clubs").add_query_param("page", 99).await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Club>>().is_empty());
    }

    #[tokio::test]
    async fn test_clubs_page_rejects_bad_pages() {
        let (server, db) = create_test_server().await;
        seed_numbered_clubs(&db, 3).await;

        for page in ["0", "-1", "two"] {
            let response = server.get("/clubs").add_query_param("page", page).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.json::<Value>().get("error").is_some());
        }
    }

    #[tokio::test]
    async fn test_search_clubs() {
        let (server, db) = create_test_server().await;
        seed_clubs(
            &db,
            &[(1, "Chess Club"), (2, "Chessboxing Society"), (3, "Go Club")],
        )
        .await;

        let response = server.get("/clubs/search").add_query_param("q", "chess").await;
        response.assert_status_ok();
        let names: Vec<_> = response
            .json::<Vec<Club>>()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Chess Club", "Chessboxing Society"]);

        let response = server.get("/clubs/search").add_query_param("q", "GO").await;
        let found: Vec<Club> = response.json();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);

        let response = server
            .get("/clubs/search")
            .add_query_param("q", "xyz-nonexistent")
            .await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Club>>().is_empty());
    }

    #[tokio::test]
    async fn test_search_without_query() {
        let (server, db) = create_test_server().await;
        seed_clubs(&db, &[(1, "Chess Club")]).await;

        let response = server.get("/clubs/search").await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Club>>().is_empty());

        let response = server.get("/clubs/search").add_query_param("q", "").await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Club>>().is_empty());
    }
}
