pub mod api;
pub mod assets;
pub mod dashboard;
pub mod home;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/login", get(home::login_page))
        .route("/post/{id}", get(home::single_post))
        .route("/dashboard", get(dashboard::index))
        .route("/dashboard/edit/{id}", get(dashboard::edit_post))
        .route("/assets/{*path}", get(assets::serve))
        .nest("/api", api::router())
}

/// The display helpers, exposed to askama as template filters.
pub mod filters {
    use crate::helpers;

    pub fn format_date(timestamp: &str) -> askama::Result<String> {
        Ok(helpers::format_date(timestamp))
    }

    pub fn format_plural(word: &str, amount: impl std::borrow::Borrow<i64>) -> askama::Result<String> {
        Ok(helpers::format_plural(word, *amount.borrow()))
    }

    pub fn format_url(url: &str) -> askama::Result<String> {
        Ok(helpers::format_url(url))
    }
}
