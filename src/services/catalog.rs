//! Catalog management service

use serde_json::Value;
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::book::{total_pages, Book, BookPage, BookPayload, BookQuery},
    repository::Repository,
    validation::BOOK_SCHEMA,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// List books with filters and pagination
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        query
            .validate()
            .map_err(|e| AppError::Validation(e.into()))?;

        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(self.config.default_per_page);

        let (books, total) = self
            .repository
            .books
            .search(&query.filter(), page, per_page)
            .await?;

        tracing::debug!(
            "Catalog list: page={} per_page={} matched={} returned={}",
            page, per_page, total, books.len()
        );

        Ok(BookPage {
            total_books: total,
            total_pages: total_pages(total, per_page),
            page,
            per_page,
            books,
        })
    }

    /// Validate a raw payload and append the book it describes
    pub async fn create_book(&self, payload: &Value) -> AppResult<Book> {
        let payload = Self::parse_payload(payload)?;

        let book = self
            .repository
            .books
            .create(payload.into(), self.config.reject_duplicate_ids)
            .await
            .inspect_err(|e| tracing::warn!("Catalog create rejected: {}", e))?;

        tracing::info!("Catalog create: book id={} \"{}\"", book.id, book.title);
        Ok(book)
    }

    /// Validate a raw payload and apply its title and author to book `id`.
    ///
    /// Validation runs before the lookup, so a bad payload is a 400 even
    /// when the book does not exist.
    pub async fn update_book(&self, id: i64, payload: &Value) -> AppResult<Book> {
        let payload = Self::parse_payload(payload)?;

        if payload.id != id {
            tracing::debug!(
                "Catalog update: ignoring body id={} for book id={}",
                payload.id, id
            );
        }

        let book = self
            .repository
            .books
            .update(id, &payload.title, &payload.author)
            .await?;

        tracing::info!("Catalog update: book id={}", id);
        Ok(book)
    }

    /// Remove book `id`
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let removed = self.repository.books.delete(id).await?;
        tracing::info!("Catalog delete: book id={} \"{}\"", removed.id, removed.title);
        Ok(())
    }

    pub async fn book_count(&self) -> usize {
        self.repository.books.count().await
    }

    fn parse_payload(payload: &Value) -> AppResult<BookPayload> {
        BOOK_SCHEMA.validate(payload).map_err(|errors| {
            tracing::warn!("Book payload rejected: {}", errors);
            AppError::Validation(errors)
        })?;

        serde_json::from_value(payload.clone())
            .map_err(|e| AppError::Internal(format!("Validated payload failed to decode: {}", e)))
    }
}
