//! HTTP API: server setup, routes, and request/response models.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;
