//! shopbook-config
//!
//! Persistent shop settings: currency, business name, investor share and where
//! the books are stored. Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{ConfigBackup, ConfigManager};
pub use model::{Config, DATA_HOME_ENV};
