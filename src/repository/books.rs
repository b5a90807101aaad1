//! Book storage: an insertion-ordered list behind a read/write lock

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter},
};

const BOOK_NOT_FOUND: &str = "Book not found";

#[derive(Clone, Default)]
pub struct BooksRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BooksRepository {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(RwLock::new(books)),
        }
    }

    /// Filter then window the catalog.
    ///
    /// Returns the requested page and the number of matching books. A page
    /// past the end yields an empty list.
    pub async fn search(
        &self,
        filter: &BookFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Book>, i64)> {
        if page < 1 || per_page < 1 {
            return Err(AppError::BadRequest(
                "page and per_page must be at least 1".to_string(),
            ));
        }

        let books = self.books.read().await;
        let matching: Vec<&Book> = books.iter().filter(|b| filter.matches(b)).collect();
        let total = matching.len() as i64;

        // Offsets beyond usize (or i64) cannot address any book
        let offset = (page - 1)
            .checked_mul(per_page)
            .and_then(|o| usize::try_from(o).ok())
            .unwrap_or(usize::MAX);
        let limit = usize::try_from(per_page).unwrap_or(usize::MAX);

        let window = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((window, total))
    }

    /// First book with the given id, in insertion order
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        self.books
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    /// Append a book. With `reject_duplicate_id`, an existing id is a conflict.
    pub async fn create(&self, book: Book, reject_duplicate_id: bool) -> AppResult<Book> {
        let mut books = self.books.write().await;

        if reject_duplicate_id && books.iter().any(|b| b.id == book.id) {
            return Err(AppError::Conflict(format!(
                "Book with id {} already exists",
                book.id
            )));
        }

        books.push(book.clone());
        Ok(book)
    }

    /// Replace title and author of the first book with the given id
    pub async fn update(&self, id: i64, title: &str, author: &str) -> AppResult<Book> {
        let mut books = self.books.write().await;

        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        book.title = title.to_string();
        book.author = author.to_string();
        Ok(book.clone())
    }

    /// Remove the first book with the given id
    pub async fn delete(&self, id: i64) -> AppResult<Book> {
        let mut books = self.books.write().await;

        let position = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        Ok(books.remove(position))
    }

    pub async fn count(&self) -> usize {
        self.books.read().await.len()
    }

    /// Copy of the whole catalog in insertion order
    pub async fn snapshot(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }
}
