//! Authenticated administration API. Everything under `/admin/api` except the
//! login route requires a bearer token.

pub mod auth;
pub mod handlers;
pub mod repository;
pub mod resources;
pub mod uploads;
pub mod validation;
