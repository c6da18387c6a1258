//! Coffee shop drinks API server.
//!
//! An axum service exposing CRUD routes for drinks. Write routes and the
//! detailed listing require a bearer token carrying the matching
//! permission; drinks are stored in PostgreSQL or, without a database
//! URL, in memory.

pub mod app;
pub mod auth;
pub mod config;
pub mod cors;
pub mod db;
pub mod drinks;
pub mod error;
