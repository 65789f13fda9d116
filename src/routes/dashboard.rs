use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};

use crate::db::models::Post;
use crate::db::posts;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::filters;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
struct DashboardTemplate {
    posts: Vec<Post>,
    username: String,
    logged_in: bool,
}

#[derive(Template)]
#[template(path = "pages/edit_post.html")]
struct EditPostTemplate {
    post: Post,
    logged_in: bool,
}

/// Dashboard: the logged-in user's own posts. Visitors without a session are
/// redirected to the login page rather than shown a 401.
pub async fn index(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(Redirect::to("/login").into_response());
    };

    let conn = state.db.get()?;
    let posts = posts::list_by_user(&conn, user.id)?;

    Ok(Html(DashboardTemplate {
        posts,
        username: user.username,
        logged_in: true,
    })
    .into_response())
}

pub async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    maybe_user: MaybeUser,
) -> AppResult<Response> {
    if maybe_user.0.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let conn = state.db.get()?;
    let post = posts::find(&conn, id)?;

    Ok(Html(EditPostTemplate {
        post,
        logged_in: true,
    })
    .into_response())
}
