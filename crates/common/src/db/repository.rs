//! Postgres-backed document store
//!
//! Rows are inserted without a `created_at`; the column default fills it
//! from the database clock and `RETURNING` hands it back.

use crate::db::models::*;
use crate::db::{BookResource, DbPool, DocumentStore, NewBook, Note, BOOK_CATEGORY};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id.to_string(),
            image_url: row.image_url,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}

impl From<BookRow> for BookResource {
    fn from(row: BookRow) -> Self {
        BookResource {
            id: row.id.to_string(),
            title: row.title,
            subject: row.subject,
            description: row.description,
            category: row.category,
            link: row.link,
        }
    }
}

#[async_trait]
impl DocumentStore for Repository {
    async fn add_note(&self, image_url: String) -> Result<Note> {
        let note = NoteActiveModel {
            id: Set(Uuid::new_v4()),
            image_url: Set(image_url),
            created_at: NotSet,
        };

        let row = note.insert(self.conn()).await?;
        tracing::debug!(note_id = %row.id, "Note row inserted");
        Ok(row.into())
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        let rows = NoteEntity::find()
            .order_by_desc(NoteColumn::CreatedAt)
            .all(self.conn())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_book(&self, book: NewBook) -> Result<BookResource> {
        let link = book.link();
        let row = BookActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(book.title),
            subject: Set(book.subject),
            description: Set(book.description),
            category: Set(BOOK_CATEGORY.to_string()),
            link: Set(link),
            created_at: NotSet,
        };

        let row = row.insert(self.conn()).await?;
        tracing::debug!(book_id = %row.id, "Book row inserted");
        Ok(row.into())
    }

    async fn list_books(&self) -> Result<Vec<BookResource>> {
        let rows = BookEntity::find()
            .order_by_asc(BookColumn::CreatedAt)
            .all(self.conn())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
