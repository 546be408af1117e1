//! In-process document store
//!
//! Timestamps are taken inside the lock and never move backwards, so
//! listing order matches insertion order even if the wall clock steps back.

use crate::db::{BookResource, DocumentStore, NewBook, Note, BOOK_CATEGORY};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    notes: Vec<Note>,
    books: Vec<BookResource>,
    last_write: Option<DateTime<Utc>>,
}

impl Collections {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_write {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_write = Some(ts);
        ts
    }
}

/// Document store held in memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseConnection {
                message: "document store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add_note(&self, image_url: String) -> Result<Note> {
        self.enter()?;
        let mut inner = self.inner.lock().await;
        let note = Note {
            id: Uuid::new_v4().to_string(),
            image_url,
            created_at: inner.next_timestamp(),
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.enter()?;
        let inner = self.inner.lock().await;
        Ok(inner.notes.iter().rev().cloned().collect())
    }

    async fn add_book(&self, book: NewBook) -> Result<BookResource> {
        self.enter()?;
        let mut inner = self.inner.lock().await;
        let link = book.link();
        let resource = BookResource {
            id: Uuid::new_v4().to_string(),
            title: book.title,
            subject: book.subject,
            description: book.description,
            category: BOOK_CATEGORY.to_string(),
            link,
        };
        inner.books.push(resource.clone());
        Ok(resource)
    }

    async fn list_books(&self) -> Result<Vec<BookResource>> {
        self.enter()?;
        let inner = self.inner.lock().await;
        Ok(inner.books.clone())
    }

    async fn ping(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseConnection {
                message: "document store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
