use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{password, session};
use crate::db::users::{self, UserUpdate};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/{id}", get(get_one).put(update).delete(delete_one))
}

#[derive(Deserialize)]
struct NewUserPayload {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    Ok(Json(users::list(&conn)?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    Ok(Json(users::find(&conn, id)?))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewUserPayload>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let user = users::create(
        &conn,
        &payload.username,
        &payload.email,
        &payload.password,
        state.config.auth.bcrypt_cost,
    )?;
    Ok(Json(user))
}

/// POST /api/users/login — verify credentials and establish a session.
/// The same message covers unknown email and wrong password so the endpoint
/// cannot be used to enumerate accounts.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Response> {
    const FAILED: &str = "incorrect email or password";

    let conn = state.db.get()?;
    let user = match users::find_by_email(&conn, &payload.email) {
        Ok(user) => user,
        Err(AppError::NotFound) => return Err(AppError::AuthFailed(FAILED.into())),
        Err(other) => return Err(other),
    };

    if !password::verify_password(&payload.password, &user.password) {
        return Err(AppError::AuthFailed(FAILED.into()));
    }

    let token = session::create_session(&conn, user.id, state.config.auth.session_hours)?;
    tracing::info!(user_id = user.id, "user logged in");

    let body = json!({
        "user": user.without_password(),
        "message": "You are now logged in!",
    });
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state, &token))],
        Json(body),
    )
        .into_response())
}

/// POST /api/users/logout — delete the session and clear the cookie.
async fn logout(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let conn = state.db.get()?;
    session::delete_session(&conn, &user.session_token)?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(&state))],
    )
        .into_response())
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UserUpdate>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let affected = users::update(&conn, id, changes, state.config.auth.bcrypt_cost)?;
    affected_rows(affected)
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let conn = state.db.get()?;
    let affected = users::delete(&conn, id)?;
    affected_rows(affected)
}

/// Update/delete responses carry the affected-row count; zero rows means the
/// id matched nothing and is reported as 404.
pub(crate) fn affected_rows(affected: usize) -> AppResult<Json<serde_json::Value>> {
    if affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({ "affected_rows": affected })))
}

fn session_cookie(state: &AppState, token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        state.config.auth.cookie_name,
        token,
        state.config.auth.session_hours * 3600
    )
}

fn clear_session_cookie(state: &AppState) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        state.config.auth.cookie_name
    )
}
