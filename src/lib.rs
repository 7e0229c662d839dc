#![forbid(unsafe_code)]

pub mod app;
pub mod clock;
pub mod commands;
pub mod config;
pub mod errors;
pub mod health;
pub mod models;
pub mod persistence;
pub mod scheduler;
pub mod slack;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
