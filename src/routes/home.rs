use askama::Template;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::db::models::Post;
use crate::db::posts;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::filters;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub posts: Vec<Post>,
    pub logged_in: bool,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub logged_in: bool,
}

#[derive(Template)]
#[template(path = "pages/single_post.html")]
pub struct SinglePostTemplate {
    pub post: Post,
    pub logged_in: bool,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// Homepage: every post, newest first.
pub async fn index(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    let conn = state.db.get()?;
    let posts = posts::list(&conn)?;

    Ok(Html(HomeTemplate {
        posts,
        logged_in: maybe_user.0.is_some(),
    })
    .into_response())
}

/// Login/signup page; already-authenticated visitors go back home.
pub async fn login_page(maybe_user: MaybeUser) -> Response {
    if maybe_user.0.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(LoginTemplate { logged_in: false }).into_response()
}

pub async fn single_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    maybe_user: MaybeUser,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = posts::find(&conn, id)?;

    Ok(Html(SinglePostTemplate {
        post,
        logged_in: maybe_user.0.is_some(),
    })
    .into_response())
}
