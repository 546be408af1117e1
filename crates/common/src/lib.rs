//! StudyHub Common Library
//!
//! Shared code for the StudyHub gateway including:
//! - Configuration management
//! - Error types and handling
//! - Document store and blob store abstractions
//! - Language model client and prompt templates
//! - Upload, summarize and question pipelines
//! - Static course content, quiz grading and the timetable builder
//! - Metrics and observability

pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod prompts;
pub mod services;
pub mod storage;
pub mod timetable;

// Re-export commonly used types
pub use config::AppConfig;
pub use content::ContentCatalog;
pub use db::{BookResource, DocumentStore, Note};
pub use errors::{AppError, Result};
pub use llm::LanguageModel;
pub use services::Services;
pub use storage::BlobStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
