use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::comments;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::routes::api::users::affected_rows;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments", get(list).post(create))
        .route("/comments/{id}", get(get_one).delete(delete_one))
}

#[derive(Deserialize)]
struct NewCommentPayload {
    comment_text: String,
    post_id: i64,
}

async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    Ok(Json(comments::list(&conn)?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    Ok(Json(comments::find(&conn, id)?))
}

/// POST /api/comments — commenter stamped from the session.
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewCommentPayload>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let comment = comments::create(&conn, &payload.comment_text, user.id, payload.post_id)?;
    Ok(Json(comment))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let affected = comments::delete(&conn, id)?;
    affected_rows(affected)
}
