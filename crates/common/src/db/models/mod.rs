//! SeaORM entity models
//!
//! One table per document collection: `notes` and `books`.

mod book;
mod note;

pub use note::{
    Entity as NoteEntity,
    Model as NoteRow,
    ActiveModel as NoteActiveModel,
    Column as NoteColumn,
};

pub use book::{
    Entity as BookEntity,
    Model as BookRow,
    ActiveModel as BookActiveModel,
    Column as BookColumn,
};
