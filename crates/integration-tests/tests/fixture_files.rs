//! Integration tests for seeding from a fixture file other than the embedded one.

use chrono::NaiveDate;

use invoicer_cli::{SeedError, seed};
use invoicer_core::fixtures::{FixtureError, FixtureFile};
use invoicer_core::{Email, InvoiceNumber};
use invoicer_integration_tests::MemoryStore;

const SMALL: &str = r#"
user:
  email: dev@example.com
  password: hunter22
customers:
  - name: Acme
    email: billing@acme.test
    invoices:
      - number: 1
        invoice_date: -1
        due_date: 30
        line_items:
          - description: Consulting
            quantity: 4
            unit_price: "150.00"
        deposits: []
"#;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date")
}

#[tokio::test]
async fn test_custom_file_replaces_embedded_data() {
    let embedded = FixtureFile::embedded()
        .expect("embedded fixtures parse")
        .resolve(day())
        .expect("embedded fixtures resolve");
    let custom = FixtureFile::parse(SMALL)
        .expect("custom fixtures parse")
        .resolve(day())
        .expect("custom fixtures resolve");

    let mut store = MemoryStore::new();
    seed(&mut store, &embedded).await.expect("first seed succeeds");
    let summary = seed(&mut store, &custom).await.expect("second seed succeeds");

    assert_eq!(summary.deleted_customers, 5);
    assert_eq!(store.customers.len(), 1);
    assert_eq!(store.users.len(), 1);
    assert_eq!(
        store.users[0].email,
        Email::parse("dev@example.com").expect("valid email")
    );

    let invoice = store.invoice(InvoiceNumber::new(1)).expect("invoice 1");
    assert_eq!(
        invoice.due_date,
        NaiveDate::from_ymd_opt(2025, 1, 30).expect("valid date")
    );
}

#[test]
fn test_invalid_file_is_a_fixture_error() {
    let broken = SMALL.replace("quantity: 4", "quantity: -4");
    let err = FixtureFile::parse(&broken).expect_err("negative quantity rejected");
    assert!(matches!(err, FixtureError::Parse(_)));

    let seed_err = SeedError::from(err);
    assert!(seed_err.to_string().starts_with("fixture error"));
}

#[tokio::test]
async fn test_due_before_invoice_date_is_seeded() {
    let late = SMALL.replace("due_date: 30", "due_date: -2");
    let set = FixtureFile::parse(&late)
        .expect("shape is valid")
        .resolve(day())
        .expect("dates are taken as given");

    let mut store = MemoryStore::new();
    seed(&mut store, &set).await.expect("seed succeeds");

    let invoice = store.invoice(InvoiceNumber::new(1)).expect("invoice 1");
    assert_eq!(
        invoice.invoice_date,
        NaiveDate::from_ymd_opt(2024, 12, 30).expect("valid date")
    );
    assert_eq!(
        invoice.due_date,
        NaiveDate::from_ymd_opt(2024, 12, 29).expect("valid date")
    );
}

#[tokio::test]
async fn test_repeated_invoice_numbers_are_seeded() {
    let repeated = format!(
        "{SMALL}{}",
        r#"  - name: Acme West
    email: west@acme.test
    invoices:
      - number: 1
        invoice_date: 0
        due_date: 14
        line_items:
          - description: Travel
            quantity: 1
            unit_price: "90.00"
"#
    );
    let set = FixtureFile::parse(&repeated)
        .expect("shape is valid")
        .resolve(day())
        .expect("repeated numbers are allowed");
    assert_eq!(set.duplicate_invoice_numbers(), [InvoiceNumber::new(1)]);

    let mut store = MemoryStore::new();
    seed(&mut store, &set).await.expect("seed succeeds");

    assert_eq!(store.customers.len(), 2);
    assert_eq!(
        store
            .invoices
            .iter()
            .filter(|i| i.number == InvoiceNumber::new(1))
            .count(),
        2
    );
}
