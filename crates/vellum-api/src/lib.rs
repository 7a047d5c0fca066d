pub mod auth;
pub mod error;
pub mod groups;
pub mod middleware;
pub mod routes;
pub mod templates;
pub mod versions;
