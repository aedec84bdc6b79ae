//! songlib-server: song catalogue HTTP server
//!
//! Stores songs and their lyrics, split into ordered couplets, in
//! PostgreSQL. New songs are enriched from an external song-info service.
//! Multi-step writes run inside one transaction carried by an explicit
//! [`db::DbContext`].

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod service;
pub mod state;
pub mod webapi;

pub use config::{Config, ConfigError};
pub use http::{bootstrap, build_router, run_server, ServerConfig, ServerError};
pub use state::AppState;
