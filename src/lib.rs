//! nfoforge - Kodi NFO scanner and scraper
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod library;
pub mod metadata;
pub mod nfo;
pub mod record;
pub mod scanner;
pub mod server;
