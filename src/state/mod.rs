/// State management module
///
/// This module handles all application state, including:
/// - Database connection and queries (library.rs)
/// - Shared data structures (data.rs)
/// - User settings loaded at startup (settings.rs)

pub mod data;
pub mod library;
pub mod settings;
