//! Document store for StudyHub
//!
//! Two append/list collections, `notes` and `books`, behind the
//! [`DocumentStore`] trait:
//! - [`Repository`]: SeaORM over Postgres, timestamps from the database clock
//! - [`MemoryStore`]: in-process store for tests and local development

mod memory;
pub mod models;
mod repository;

pub use memory::MemoryStore;
pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Category every catalog entry created through the book form carries
pub const BOOK_CATEGORY: &str = "Textbook";

/// Link value meaning "no attachment"
pub const NO_ATTACHMENT_LINK: &str = "#";

/// A saved image of handwritten or printed notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A recommended textbook in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResource {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub link: String,
}

/// Fields of a catalog entry before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub subject: String,
    pub description: String,
    /// Download URL of the attached PDF, if one was uploaded
    pub pdf_url: Option<String>,
}

impl NewBook {
    /// Stored link: the PDF URL or [`NO_ATTACHMENT_LINK`]
    pub fn link(&self) -> String {
        self.pdf_url
            .clone()
            .unwrap_or_else(|| NO_ATTACHMENT_LINK.to_string())
    }
}

/// Append/list access to the `notes` and `books` collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a note; the store assigns `id` and `created_at`
    async fn add_note(&self, image_url: String) -> Result<Note>;

    /// All notes, newest first
    async fn list_notes(&self) -> Result<Vec<Note>>;

    /// Append a catalog entry; category is always [`BOOK_CATEGORY`]
    async fn add_book(&self, book: NewBook) -> Result<BookResource>;

    /// All catalog entries in insertion order
    async fn list_books(&self) -> Result<Vec<BookResource>>;

    /// Check connectivity
    async fn ping(&self) -> Result<()>;

    /// Backend name for logs and readiness output
    fn backend(&self) -> &'static str;
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })?;

        info!("Database connection established");

        Ok(Self { conn })
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;
        Ok(())
    }
}

const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS notes (
        id UUID PRIMARY KEY,
        image_url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS notes_created_at_idx ON notes (created_at DESC)",
    "CREATE TABLE IF NOT EXISTS books (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        subject TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'Textbook',
        link TEXT NOT NULL DEFAULT '#',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

/// Create both collections if they do not exist yet
pub async fn migrate(pool: &DbPool) -> Result<()> {
    for statement in MIGRATIONS {
        pool.conn().execute_unprepared(statement).await?;
    }
    info!(statements = MIGRATIONS.len(), "Database schema ready");
    Ok(())
}

/// Build the document store selected by configuration
pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend.as_str() {
        "postgres" => {
            let pool = DbPool::new(config).await?;
            if config.run_migrations {
                migrate(&pool).await?;
            }
            Ok(Arc::new(Repository::new(pool)))
        }
        "memory" => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown database backend: {}", other),
        }),
    }
}
