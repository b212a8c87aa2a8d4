//! Every format must store and return the same data, field for field.
//! That equivalence is the contract live format migration relies on.

use chrono::{Duration, Utc};
use librodb_model::{Book, EntityId, Loan, Role, User};
use librodb_store::{BackendFactory, Criteria, Format};
use proptest::prelude::*;
use tempfile::TempDir;

fn populated_book() -> Book {
    let mut book = Book::new(
        "A Canticle for Leibowitz",
        EntityId::new(),
        Some("9780306406157".to_string()),
        1959,
        "Science Fiction",
        334,
    )
    .unwrap();
    book.mark_borrowed(EntityId::new(), Utc::now(), Utc::now() + Duration::days(14));
    book
}

fn sparse_book() -> Book {
    Book::new("Roadside Picnic", EntityId::new(), None, 1972, "", 145).unwrap()
}

#[test]
fn every_format_roundtrips_books() {
    for format in Format::ALL {
        let dir = TempDir::new().unwrap();
        let factory = BackendFactory::new(dir.path());

        let full = populated_book();
        let sparse = sparse_book();
        {
            let backend = factory.open::<Book>(format).unwrap();
            backend.save(&full).unwrap();
            backend.save(&sparse).unwrap();
        }

        // A fresh backend must see everything the first one wrote.
        let backend = factory.open::<Book>(format).unwrap();
        assert_eq!(
            backend.load(&full.id).unwrap(),
            Some(full.clone()),
            "format {format}"
        );
        assert_eq!(
            backend.load(&sparse.id).unwrap(),
            Some(sparse.clone()),
            "format {format}"
        );
        assert_eq!(backend.load_all().unwrap().len(), 2, "format {format}");
    }
}

#[test]
fn every_format_roundtrips_user_lists() {
    for format in Format::ALL {
        let dir = TempDir::new().unwrap();
        let factory = BackendFactory::new(dir.path());

        let mut user = User::new("Reader", Some("reader@example.org".into()), Role::User).unwrap();
        user.borrowed_books = vec![EntityId::from("book-1"), EntityId::from("book-2")];

        let backend = factory.open::<User>(format).unwrap();
        backend.save(&user).unwrap();
        let loaded = backend.load(&user.id).unwrap().unwrap();
        assert_eq!(loaded, user, "format {format}");
    }
}

#[test]
fn search_semantics_agree_across_formats() {
    let author = EntityId::new();
    let matching = Book::new("Match", author.clone(), None, 2000, "Essay", 90).unwrap();
    let other = Book::new("Other", EntityId::new(), None, 2000, "Essay", 90).unwrap();
    let criteria = Criteria::new()
        .eq("author_id", author.as_str())
        .eq("available", true);

    for format in Format::ALL {
        let dir = TempDir::new().unwrap();
        let factory = BackendFactory::new(dir.path());
        let backend = factory.open::<Book>(format).unwrap();
        backend.save(&matching).unwrap();
        backend.save(&other).unwrap();

        let hits = backend.search(&criteria).unwrap();
        assert_eq!(hits, vec![matching.clone()], "format {format}");
    }
}

#[test]
fn float_and_datetime_criteria_agree_across_formats() {
    let now = Utc::now();
    let fresh = Loan::new(EntityId::new(), EntityId::new(), now, now + Duration::days(14));
    let mut fined = Loan::new(EntityId::new(), EntityId::new(), now, now);
    fined.return_date = Some(now);
    fined.penalty_amount = 1.5;

    for format in Format::ALL {
        let dir = TempDir::new().unwrap();
        let backend = BackendFactory::new(dir.path()).open::<Loan>(format).unwrap();
        backend.save(&fresh).unwrap();
        backend.save(&fined).unwrap();

        // 0.0 renders as "0.0" in JSON but "0" in the flat encoding;
        // both representations must select the same loan everywhere.
        let zero = backend
            .search(&Criteria::new().eq("penalty_amount", 0.0))
            .unwrap();
        assert_eq!(zero, vec![fresh.clone()], "format {format}");

        let stamped = backend
            .search(&Criteria::new().eq("borrow_date", serde_json::to_value(now).unwrap()))
            .unwrap();
        assert_eq!(stamped.len(), 2, "format {format}");
    }
}

#[test]
fn formats_do_not_interfere_in_one_directory() {
    let dir = TempDir::new().unwrap();
    let factory = BackendFactory::new(dir.path());
    let book = sparse_book();

    for format in Format::ALL {
        factory.open::<Book>(format).unwrap().save(&book).unwrap();
    }
    // Deleting from one format leaves the others untouched.
    assert!(factory
        .open::<Book>(Format::Csv)
        .unwrap()
        .delete(&book.id)
        .unwrap());
    for format in [Format::Text, Format::Json, Format::Xml, Format::Sqlite] {
        assert!(
            factory
                .open::<Book>(format)
                .unwrap()
                .exists(&book.id)
                .unwrap(),
            "format {format}"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Titles and genres with quoting-sensitive characters and edge
    /// whitespace survive every format unchanged.
    #[test]
    fn awkward_strings_roundtrip(
        title in " ?[a-zA-Z0-9,.&<>'\"-]{1,8}( [a-zA-Z0-9,.&<>'\"-]{1,8}){0,3} ?",
        genre in "( ?[a-zA-Z0-9,.&<>'\"-]{1,8}( [a-zA-Z0-9,.&<>'\"-]{1,8}){0,2} ?)?",
    ) {
        let book = Book::new(title, EntityId::new(), None, 2024, genre, 100).unwrap();
        for format in Format::ALL {
            let dir = TempDir::new().unwrap();
            let backend = BackendFactory::new(dir.path()).open::<Book>(format).unwrap();
            backend.save(&book).unwrap();
            prop_assert_eq!(backend.load(&book.id).unwrap(), Some(book.clone()));
        }
    }
}
