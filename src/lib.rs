//! Orchestration layer between a book-recommendation front-end and the
//! remote recommendation engine.
//!
//! Three strategies (default, demographic, curated) each own an input
//! collector or filter and a request lifecycle. The `api` module exposes them
//! to the presentation layer over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
