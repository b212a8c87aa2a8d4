//! Catalogue management and the author / book referential check.

use crate::error::CatalogError;
use librodb_core::Repository;
use librodb_model::{Author, Book, EntityId};
use librodb_store::Criteria;
use std::sync::Arc;
use tracing::info;

/// Keeps the book / author relationship consistent.
///
/// Books reference authors by id only. Storage does not enforce the
/// reference, so this service refuses to add a book for an unknown
/// author and refuses to delete an author who still has books.
pub struct CatalogService {
    books: Arc<Repository<Book>>,
    authors: Arc<Repository<Author>>,
}

impl CatalogService {
    /// Creates the service over the two repositories.
    #[must_use]
    pub fn new(books: Arc<Repository<Book>>, authors: Arc<Repository<Author>>) -> Self {
        Self { books, authors }
    }

    /// Adds an author to the catalogue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name.
    pub fn add_author(
        &self,
        name: &str,
        nationality: &str,
        biography: &str,
    ) -> Result<Author, CatalogError> {
        let mut author = Author::new(name, nationality, biography)?;
        self.authors.save(&mut author)?;
        info!(author = %author.id, "author added");
        Ok(author)
    }

    /// Adds a book, requiring its author to exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AuthorNotFound`] for a dangling author id,
    /// or a validation error for bad book data.
    pub fn add_book(
        &self,
        title: &str,
        author_id: &EntityId,
        isbn: Option<String>,
        publication_year: i32,
        genre: &str,
        pages: u32,
    ) -> Result<Book, CatalogError> {
        if !self.authors.exists(author_id)? {
            return Err(CatalogError::AuthorNotFound {
                id: author_id.clone(),
            });
        }
        let mut book = Book::new(title, author_id.clone(), isbn, publication_year, genre, pages)?;
        self.books.save(&mut book)?;
        info!(book = %book.id, author = %author_id, "book added");
        Ok(book)
    }

    /// All books by one author.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn books_by(&self, author_id: &EntityId) -> Result<Vec<Book>, CatalogError> {
        Ok(self
            .books
            .find_by(&Criteria::new().eq("author_id", author_id.as_str()))?)
    }

    /// Deletes an author, but only once no book references them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ReferentialIntegrity`] while dependent
    /// books exist; nothing is deleted in that case.
    pub fn delete_author(&self, author_id: &EntityId) -> Result<bool, CatalogError> {
        let dependents = self.books_by(author_id)?.len();
        if dependents > 0 {
            return Err(CatalogError::ReferentialIntegrity {
                author_id: author_id.clone(),
                dependents,
            });
        }
        let deleted = self.authors.delete(author_id)?;
        if deleted {
            info!(author = %author_id, "author deleted");
        }
        Ok(deleted)
    }

    /// Deletes a book, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn delete_book(&self, book_id: &EntityId) -> Result<bool, CatalogError> {
        let deleted = self.books.delete(book_id)?;
        if deleted {
            info!(book = %book_id, "book deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librodb_store::{BackendFactory, Format};
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> CatalogService {
        let factory = BackendFactory::new(dir.path());
        CatalogService::new(
            Arc::new(Repository::new(factory.open::<Book>(Format::Json).unwrap())),
            Arc::new(Repository::new(
                factory.open::<Author>(Format::Json).unwrap(),
            )),
        )
    }

    #[test]
    fn book_requires_existing_author() {
        let dir = TempDir::new().unwrap();
        let catalog = service(&dir);
        let err = catalog
            .add_book("Orphan", &EntityId::new(), None, 2020, "Essay", 10)
            .unwrap_err();
        assert!(matches!(err, CatalogError::AuthorNotFound { .. }));
    }

    #[test]
    fn author_with_books_cannot_be_deleted() {
        let dir = TempDir::new().unwrap();
        let catalog = service(&dir);

        let author = catalog.add_author("Borges", "Argentine", "").unwrap();
        catalog
            .add_book("Ficciones", &author.id, None, 1944, "Short stories", 174)
            .unwrap();

        let err = catalog.delete_author(&author.id).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ReferentialIntegrity { dependents: 1, .. }
        ));
        // The author is still there.
        assert!(catalog.authors.exists(&author.id).unwrap());
    }

    #[test]
    fn author_is_deletable_after_their_books() {
        let dir = TempDir::new().unwrap();
        let catalog = service(&dir);

        let author = catalog.add_author("Borges", "Argentine", "").unwrap();
        let book = catalog
            .add_book("Ficciones", &author.id, None, 1944, "Short stories", 174)
            .unwrap();

        assert!(catalog.delete_book(&book.id).unwrap());
        assert!(catalog.delete_author(&author.id).unwrap());
        assert!(!catalog.delete_author(&author.id).unwrap());
    }

    #[test]
    fn books_by_author() {
        let dir = TempDir::new().unwrap();
        let catalog = service(&dir);

        let borges = catalog.add_author("Borges", "Argentine", "").unwrap();
        let other = catalog.add_author("Cortázar", "Argentine", "").unwrap();
        catalog
            .add_book("Ficciones", &borges.id, None, 1944, "Short stories", 174)
            .unwrap();
        catalog
            .add_book("Rayuela", &other.id, None, 1963, "Novel", 736)
            .unwrap();

        let books = catalog.books_by(&borges.id).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Ficciones");
    }
}
