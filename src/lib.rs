// Library exports so integration tests can exercise the modules directly.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod helpers;
pub mod routes;
pub mod state;
