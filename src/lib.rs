// Library root. The binary entry point is src/main.rs.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod game;
pub mod logger;
pub mod selection;
pub mod session;
pub mod splash;
pub mod story_config;
