//! Book model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Caller-supplied identifier
    pub id: i64,
    pub title: String,
    pub author: String,
}

/// Create / update book request.
///
/// Only built from payloads that already passed `BOOK_SCHEMA`. On update the
/// `id` is required but not applied.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BookPayload {
    #[schema(minimum = 1)]
    pub id: i64,
    pub title: String,
    pub author: String,
}

impl From<BookPayload> for Book {
    fn from(payload: BookPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            author: payload.author,
        }
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct BookQuery {
    #[validate(range(min = 1, message = "min value is 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, message = "min value is 1"))]
    pub per_page: Option<i64>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
}

impl BookQuery {
    pub fn filter(&self) -> BookFilter {
        BookFilter::new(self.title.as_deref(), self.author.as_deref())
    }
}

/// Lowercased substring filters; a blank filter matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    title: Option<String>,
    author: Option<String>,
}

impl BookFilter {
    pub fn new(title: Option<&str>, author: Option<&str>) -> Self {
        fn normalize(value: Option<&str>) -> Option<String> {
            value.filter(|v| !v.is_empty()).map(str::to_lowercase)
        }

        Self {
            title: normalize(title),
            author: normalize(author),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        let title_ok = self
            .title
            .as_ref()
            .map_or(true, |t| book.title.to_lowercase().contains(t.as_str()));
        let author_ok = self
            .author
            .as_ref()
            .map_or(true, |a| book.author.to_lowercase().contains(a.as_str()));
        title_ok && author_ok
    }
}

/// Paginated book list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookPage {
    /// Number of books matching the filters
    pub total_books: i64,
    pub total_pages: i64,
    pub page: i64,
    pub per_page: i64,
    pub books: Vec<Book>,
}

/// Number of pages of `per_page` needed to hold `total` books
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 0;
    }
    total / per_page + i64::from(total % per_page != 0)
}

/// Delete confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResult {
    pub result: String,
}

impl DeleteResult {
    pub fn deleted() -> Self {
        Self {
            result: "Book deleted".to_string(),
        }
    }
}

/// Records the catalog starts with
pub fn seed_books() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "Python Crash Course".to_string(),
            author: "Eric Matthes".to_string(),
        },
        Book {
            id: 2,
            title: "Fluent Python".to_string(),
            author: "Luciano Ramalho".to_string(),
        },
        Book {
            id: 3,
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
        },
    ]
}
