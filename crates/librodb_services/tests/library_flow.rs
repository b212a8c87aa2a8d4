//! End-to-end flow: accounts, catalogue, loans, and a live format
//! switch in the middle.

use chrono::Duration;
use librodb_core::{Config, EntityManager};
use librodb_model::{Author, Book, Loan, Role, User};
use librodb_services::{AuthService, CatalogError, CatalogService, LoanPolicy, LoanService};
use librodb_store::Format;
use tempfile::TempDir;

fn services(manager: &EntityManager) -> (AuthService, CatalogService, LoanService) {
    let books = manager.repository::<Book>().unwrap();
    let authors = manager.repository::<Author>().unwrap();
    let users = manager.repository::<User>().unwrap();
    let loans = manager.repository::<Loan>().unwrap();
    (
        AuthService::new(users.clone()),
        CatalogService::new(books.clone(), authors),
        LoanService::new(books, users, loans, LoanPolicy::default()),
    )
}

#[test]
fn full_library_lifecycle_survives_a_format_switch() {
    let dir = TempDir::new().unwrap();
    let manager = EntityManager::new(Config::new(dir.path()).with_format(Format::Json));

    // Seed in JSON.
    let (auth, catalog, _) = services(&manager);
    let reader = auth
        .register("Ana", "ana@example.org", "s3cret", Role::User)
        .unwrap();
    let author = catalog
        .add_author("Ursula K. Le Guin", "American", "")
        .unwrap();
    let book = catalog
        .add_book(
            "The Dispossessed",
            &author.id,
            Some("9780306406157".to_string()),
            1974,
            "Science Fiction",
            341,
        )
        .unwrap();

    // Move everything into SQLite and rebind the services.
    let report = manager.set_format(Format::Sqlite).unwrap();
    assert_eq!(report.total(), 3);
    assert_eq!(manager.format(), Format::Sqlite);
    let (auth, catalog, loans) = services(&manager);

    // The migrated account still authenticates.
    let user = auth.authenticate("ana@example.org", "s3cret").unwrap();
    assert_eq!(user.id, reader.id);

    // Borrow and return six days late: 6 * 0.50.
    let loan = loans.borrow(&book.id, &reader.id).unwrap();
    let penalty = loans
        .return_book_at(&book.id, loan.due_date + Duration::days(6))
        .unwrap();
    assert_eq!(penalty, 3.0);

    // The author is protected while the book exists.
    let err = catalog.delete_author(&author.id).unwrap_err();
    assert!(matches!(err, CatalogError::ReferentialIntegrity { .. }));
    catalog.delete_book(&book.id).unwrap();
    assert!(catalog.delete_author(&author.id).unwrap());
}

#[test]
fn repeated_migration_does_not_duplicate_data() {
    let dir = TempDir::new().unwrap();
    let manager = EntityManager::new(Config::new(dir.path()).with_format(Format::Csv));

    let (_, catalog, _) = services(&manager);
    let author = catalog.add_author("Lem", "Polish", "").unwrap();
    catalog
        .add_book("Solaris", &author.id, None, 1961, "Science Fiction", 204)
        .unwrap();

    manager.set_format(Format::Xml).unwrap();
    manager.set_format(Format::Csv).unwrap();
    manager.set_format(Format::Xml).unwrap();

    let books = manager.repository::<Book>().unwrap();
    assert_eq!(books.get_all().unwrap().len(), 1);
    let authors = manager.repository::<Author>().unwrap();
    assert_eq!(authors.get_all().unwrap().len(), 1);
}
