use std::fmt;

use serde::{Deserialize, Serialize};

use super::store::BookError;

/// Identifier of a stored book, a hyphenated UUID issued by the store.
pub type BookId = String;

/// Reading progress of a book.
///
/// `to_read`, `to-read` and `toread` are accepted on input as older spellings
/// of [`BookStatus::Unread`]; output always uses the canonical names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    #[serde(alias = "to_read", alias = "to-read", alias = "toread")]
    Unread,
    Reading,
    Read,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [BookStatus::Unread, BookStatus::Reading, BookStatus::Read];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Unread => "unread",
            BookStatus::Reading => "reading",
            BookStatus::Read => "read",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub status: BookStatus,
}

/// Validated input for a new record. Title and author are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
    status: BookStatus,
}

impl NewBook {
    pub fn new(
        title: impl AsRef<str>,
        author: impl AsRef<str>,
        status: BookStatus,
    ) -> Result<Self, BookError> {
        let title = title.as_ref().trim();
        let author = author.as_ref().trim();

        let mut missing = Vec::new();
        if title.is_empty() {
            missing.push("title");
        }
        if author.is_empty() {
            missing.push("author");
        }
        if !missing.is_empty() {
            return Err(BookError::invalid_input(
                "Title and author are required",
                missing,
            ));
        }

        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            status,
        })
    }

    pub(super) fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            status: self.status,
        }
    }
}

/// Records every fresh catalog starts with when seeding is enabled.
pub fn sample_books() -> Vec<NewBook> {
    [
        ("The Great Gatsby", "F. Scott Fitzgerald", BookStatus::Read),
        ("1984", "George Orwell", BookStatus::Reading),
        ("To Kill a Mockingbird", "Harper Lee", BookStatus::Unread),
    ]
    .into_iter()
    .map(|(title, author, status)| NewBook {
        title: title.to_string(),
        author: author.to_string(),
        status,
    })
    .collect()
}

/// Request model for creating a new book.
///
/// Fields are optional so that a missing title or author reaches validation
/// and is reported as invalid input rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub status: Option<BookStatus>,
}

impl CreateBook {
    pub fn validate(self) -> Result<NewBook, BookError> {
        NewBook::new(
            self.title.unwrap_or_default(),
            self.author.unwrap_or_default(),
            self.status.unwrap_or_default(),
        )
    }
}

/// Request model for changing a book's status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatus {
    #[serde(default)]
    pub status: Option<BookStatus>,
}

impl UpdateStatus {
    pub fn validate(self) -> Result<BookStatus, BookError> {
        self.status
            .ok_or_else(|| BookError::invalid_input("Status is required", vec!["status"]))
    }
}

/// Response body for a single book; the id is the path parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookView {
    pub title: String,
    pub author: String,
    pub status: BookStatus,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            status: book.status,
        }
    }
}

/// Response body for a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBook {
    pub id: BookId,
}

/// Acknowledgement body for update and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
