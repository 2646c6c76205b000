// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod session;
pub mod utils;

// Re-export specific items for convenience
pub use runner::run_attempt;
pub use session::AttemptSession;
