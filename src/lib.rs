//! Employee search directory API.
//!
//! A thin CRUD/search layer over a SQLite `employees` table. Every request
//! passes a per-IP sliding-window admission check first; see
//! [`rate_limit::SlidingWindowLimiter`].

pub mod admission;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod store;

pub use app::router;
