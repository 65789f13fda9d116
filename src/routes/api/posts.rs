use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::{posts, votes};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::routes::api::users::affected_rows;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list).post(create))
        // Static segment; registered alongside /posts/{id} without conflict
        .route("/posts/upvote", put(upvote))
        .route("/posts/{id}", get(get_one).put(update).delete(delete_one))
}

#[derive(Deserialize)]
struct NewPostPayload {
    title: String,
    post_url: String,
}

#[derive(Deserialize)]
struct UpvotePayload {
    post_id: i64,
}

#[derive(Deserialize)]
struct UpdatePostPayload {
    title: String,
}

async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    Ok(Json(posts::list(&conn)?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    Ok(Json(posts::find(&conn, id)?))
}

/// POST /api/posts — the owner is stamped from the session, not the payload.
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewPostPayload>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let post = posts::create(&conn, &payload.title, &payload.post_url, user.id)?;
    Ok(Json(post))
}

/// PUT /api/posts/upvote — record a vote for the session user and return the
/// post with its recomputed vote_count.
async fn upvote(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpvotePayload>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db.get()?;
    let post = votes::upvote(&mut conn, user.id, payload.post_id)?;
    Ok(Json(post))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostPayload>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let affected = posts::update_title(&conn, id, &payload.title)?;
    affected_rows(affected)
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let affected = posts::delete(&conn, id)?;
    affected_rows(affected)
}
