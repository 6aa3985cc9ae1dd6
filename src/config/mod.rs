/// Database configuration and connection management
pub mod database;

/// Billing settings and category seeds loaded from config.toml
pub mod settings;
