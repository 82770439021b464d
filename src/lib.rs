// src/lib.rs

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod name_key;
pub mod reconcile;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod store;
pub mod submit;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
