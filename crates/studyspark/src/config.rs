//! Configuration loading from environment variables.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::{find_book, ALGEBRA_1_NAME};

pub const DB_ENV: &str = "STUDYSPARK_DB";
pub const BOOK_ENV: &str = "STUDYSPARK_BOOK";
pub const DEFAULT_DB_PATH: &str = "studyspark.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} names an unknown book: {value}")]
    UnknownBook { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SQLite file holding the saved records
    pub db_path: PathBuf,
    /// Book used when none is given on the command line
    pub book: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            book: ALGEBRA_1_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Reads `STUDYSPARK_DB` and `STUDYSPARK_BOOK`, either from the
    /// environment or from a `.env` file. Unset variables fall back to
    /// the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(path) = lookup(DB_ENV).filter(|v| !v.trim().is_empty()) {
            settings.db_path = PathBuf::from(path);
        }

        if let Some(book) = lookup(BOOK_ENV).filter(|v| !v.trim().is_empty()) {
            if find_book(&book).is_none() {
                return Err(ConfigError::UnknownBook {
                    var: BOOK_ENV,
                    value: book,
                });
            }
            settings.book = book;
        }

        Ok(settings)
    }
}
