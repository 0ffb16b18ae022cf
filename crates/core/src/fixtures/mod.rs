//! The fixture data table.
//!
//! Fixtures live in a YAML asset compiled into the crate
//! (`crates/core/fixtures/invoices.yaml`). Every date in the file is a day
//! offset from the seeding day; [`FixtureFile::resolve`] turns the file into
//! a [`FixtureSet`] of fully-built aggregates for one concrete day.
//!
//! ## YAML Format
//!
//! ```yaml
//! user:
//!   email: rachel@remix.run
//!   password: racheliscool
//! customers:
//!   - name: Stankonia
//!     email: stan@konia.jk
//!     invoices:
//!       - number: 2000
//!         invoice_date: -5
//!         due_date: 0
//!         line_items:
//!           - { description: Robbin Drawing, quantity: 1, unit_price: "6000.23" }
//!         deposits:
//!           - { amount: "3109.00", deposit_date: 0, note: "Now we're talking :)" }
//! ```
//!
//! Parsing enforces the per-field rules: valid emails, positive quantities,
//! and non-negative amounts with at most two decimals. Resolution only turns
//! offsets into dates. Cross-record consistency (due date not before invoice
//! date, distinct invoice numbers, deposits against totals) is not enforced;
//! [`FixtureSet::duplicate_invoice_numbers`] and
//! [`NewInvoice::is_due_before_issue`] report it for callers that want to warn.

mod aggregate;

use std::collections::HashSet;

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::dates;
use crate::types::{Email, InvoiceNumber, Money, Quantity};

pub use aggregate::{
    CustomerBuilder, FixtureCounts, InvoiceBuilder, NewCustomer, NewDeposit, NewInvoice,
    NewLineItem, NewUser,
};

/// The fixture table shipped with the crate.
pub const EMBEDDED_FIXTURES: &str = include_str!("../../fixtures/invoices.yaml");

/// Errors raised while loading or resolving fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The YAML is malformed or a field failed validation while parsing.
    #[error("failed to parse fixtures: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A day offset lands outside the representable calendar.
    #[error("{field} offset of {offset} days is out of range")]
    DateOutOfRange {
        /// Which date was being resolved.
        field: String,
        /// The offending offset.
        offset: i64,
    },
}

/// A date written as a number of days from the seeding day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DayOffset(pub i64);

impl DayOffset {
    fn resolve(
        self,
        today: NaiveDate,
        field: impl FnOnce() -> String,
    ) -> Result<NaiveDate, FixtureError> {
        dates::days_from(today, self.0).ok_or_else(|| FixtureError::DateOutOfRange {
            field: field(),
            offset: self.0,
        })
    }
}

/// Top level of the fixture file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureFile {
    pub user: UserFixture,
    pub customers: Vec<CustomerFixture>,
}

/// The login user.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserFixture {
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for UserFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserFixture")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerFixture {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub invoices: Vec<InvoiceFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceFixture {
    pub number: InvoiceNumber,
    pub invoice_date: DayOffset,
    pub due_date: DayOffset,
    #[serde(default)]
    pub line_items: Vec<LineItemFixture>,
    #[serde(default)]
    pub deposits: Vec<DepositFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemFixture {
    pub description: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositFixture {
    pub amount: Money,
    pub deposit_date: DayOffset,
    pub note: String,
}

impl FixtureFile {
    /// Parse fixtures from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Parse`] for malformed YAML, unknown fields, or
    /// values that fail type validation (bad email, zero quantity, negative
    /// or sub-cent amounts).
    pub fn parse(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The fixture table compiled into this crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded asset itself is broken.
    pub fn embedded() -> Result<Self, FixtureError> {
        Self::parse(EMBEDDED_FIXTURES)
    }

    /// Resolve every day offset against `today` and build the aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::DateOutOfRange`] if an offset leaves the
    /// representable calendar.
    pub fn resolve(&self, today: NaiveDate) -> Result<FixtureSet, FixtureError> {
        let user = NewUser {
            email: self.user.email.clone(),
            password: SecretString::from(self.user.password.clone()),
        };

        let customers = self
            .customers
            .iter()
            .map(|customer| customer.resolve(today))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FixtureSet::new(user, customers))
    }
}

impl CustomerFixture {
    fn resolve(&self, today: NaiveDate) -> Result<NewCustomer, FixtureError> {
        let mut builder = CustomerBuilder::new(self.name.clone(), self.email.clone());
        for invoice in &self.invoices {
            builder = builder.invoice(invoice.resolve(today)?);
        }
        Ok(builder.build())
    }
}

impl InvoiceFixture {
    fn resolve(&self, today: NaiveDate) -> Result<NewInvoice, FixtureError> {
        let number = self.number;
        let invoice_date = self
            .invoice_date
            .resolve(today, || format!("invoice {number} invoice_date"))?;
        let due_date = self
            .due_date
            .resolve(today, || format!("invoice {number} due_date"))?;

        let mut builder = InvoiceBuilder::new(number, invoice_date, due_date);
        for item in &self.line_items {
            builder = builder.line_item(item.description.clone(), item.quantity, item.unit_price);
        }
        for (i, deposit) in self.deposits.iter().enumerate() {
            let deposit_date = deposit
                .deposit_date
                .resolve(today, || format!("invoice {number} deposit {i} deposit_date"))?;
            builder = builder.deposit(deposit.amount, deposit_date, deposit.note.clone());
        }

        Ok(builder.build())
    }
}

/// Fixtures resolved for one seeding day, ready to persist in order.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    user: NewUser,
    customers: Vec<NewCustomer>,
}

impl FixtureSet {
    #[must_use]
    pub const fn new(user: NewUser, customers: Vec<NewCustomer>) -> Self {
        Self { user, customers }
    }

    #[must_use]
    pub const fn user(&self) -> &NewUser {
        &self.user
    }

    /// Customers in table order.
    #[must_use]
    pub fn customers(&self) -> &[NewCustomer] {
        &self.customers
    }

    /// Find an invoice by number. With repeated numbers, the first in table
    /// order wins.
    #[must_use]
    pub fn invoice(&self, number: InvoiceNumber) -> Option<&NewInvoice> {
        self.customers
            .iter()
            .flat_map(NewCustomer::invoices)
            .find(|invoice| invoice.number() == number)
    }

    /// Invoice numbers used more than once, each listed once in order of
    /// first repeat.
    #[must_use]
    pub fn duplicate_invoice_numbers(&self) -> Vec<InvoiceNumber> {
        let mut seen = HashSet::new();
        let mut repeated = Vec::new();
        for invoice in self.customers.iter().flat_map(NewCustomer::invoices) {
            let number = invoice.number();
            if !seen.insert(number) && !repeated.contains(&number) {
                repeated.push(number);
            }
        }
        repeated
    }

    /// Rows this set produces once seeded.
    #[must_use]
    pub fn counts(&self) -> FixtureCounts {
        self.customers.iter().fold(
            FixtureCounts {
                users: 1,
                ..FixtureCounts::default()
            },
            |acc, customer| acc.plus(FixtureCounts::of_customer(customer)),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn embedded_set() -> FixtureSet {
        FixtureFile::embedded().unwrap().resolve(day()).unwrap()
    }

    #[test]
    fn embedded_fixtures_parse() {
        let file = FixtureFile::embedded().unwrap();
        assert_eq!(file.user.email.as_str(), "rachel@remix.run");
        assert_eq!(file.customers.len(), 5);
    }

    #[test]
    fn embedded_counts() {
        let counts = embedded_set().counts();
        assert_eq!(
            counts,
            FixtureCounts {
                users: 1,
                customers: 5,
                invoices: 5,
                line_items: 6,
                deposits: 15,
            }
        );
    }

    #[test]
    fn customers_keep_table_order() {
        let names: Vec<_> = embedded_set()
            .customers()
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        assert_eq!(
            names,
            ["Santa Monica", "Stankonia", "Ocean Avenue", "Tubthumper", "Wide Open Spaces"]
        );
    }

    #[test]
    fn user_password_is_carried_as_secret() {
        let set = embedded_set();
        assert_eq!(set.user().password.expose_secret(), "racheliscool");
        assert!(!format!("{:?}", FixtureFile::embedded().unwrap().user).contains("racheliscool"));
    }

    #[test]
    fn stankonia_invoice_is_due_today() {
        let set = embedded_set();
        let invoice = set.invoice(InvoiceNumber::new(2000)).unwrap();
        assert_eq!(invoice.due_date(), day());
        assert_eq!(invoice.invoice_date(), dates::days_from(day(), -5).unwrap());
        assert_eq!(invoice.deposits_total(), Money::parse("5606.01").unwrap());
        assert_eq!(invoice.deposits().last().unwrap().deposit_date, day());
    }

    #[test]
    fn every_due_date_is_on_or_after_invoice_date() {
        for customer in embedded_set().customers() {
            for invoice in customer.invoices() {
                assert!(!invoice.is_due_before_issue(), "{}", invoice.number());
            }
        }
    }

    #[test]
    fn wide_open_spaces_is_partially_paid() {
        let set = embedded_set();
        let invoice = set.invoice(InvoiceNumber::new(1998)).unwrap();
        assert_eq!(invoice.total(), Money::parse("13801.95").unwrap());
        assert_eq!(invoice.deposits_total(), Money::parse("7200.65").unwrap());
        assert!(invoice.balance_due().is_sign_positive());
    }

    #[test]
    fn rejects_unknown_fields() {
        let yaml = "user: { email: a@b.c, password: x, role: admin }\ncustomers: []\n";
        assert!(matches!(FixtureFile::parse(yaml), Err(FixtureError::Parse(_))));
    }

    #[test]
    fn rejects_zero_quantity_while_parsing() {
        let yaml = r#"
user: { email: a@b.c, password: x }
customers:
  - name: Zero
    email: zero@b.c
    invoices:
      - number: 1
        invoice_date: 0
        due_date: 0
        line_items:
          - { description: Nothing, quantity: 0, unit_price: "1.00" }
"#;
        assert!(matches!(FixtureFile::parse(yaml), Err(FixtureError::Parse(_))));
    }

    #[test]
    fn embedded_invoice_numbers_are_distinct() {
        assert!(embedded_set().duplicate_invoice_numbers().is_empty());
    }

    #[test]
    fn duplicate_invoice_numbers_are_kept_and_reported() {
        let yaml = r"
user: { email: a@b.c, password: x }
customers:
  - { name: One, email: one@b.c, invoices: [{ number: 5, invoice_date: 0, due_date: 1 }] }
  - { name: Two, email: two@b.c, invoices: [{ number: 5, invoice_date: 0, due_date: 1 }] }
  - { name: Six, email: six@b.c, invoices: [{ number: 5, invoice_date: 0, due_date: 1 }] }
";
        let set = FixtureFile::parse(yaml).unwrap().resolve(day()).unwrap();
        assert_eq!(set.counts().invoices, 3);
        assert_eq!(set.duplicate_invoice_numbers(), [InvoiceNumber::new(5)]);
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        let yaml = r"
user: { email: a@b.c, password: x }
customers:
  - { name: Far, email: far@b.c, invoices: [{ number: 1, invoice_date: 0, due_date: 9999999999 }] }
";
        let err = FixtureFile::parse(yaml).unwrap().resolve(day()).unwrap_err();
        assert!(matches!(err, FixtureError::DateOutOfRange { offset: 9_999_999_999, .. }));
    }

    #[test]
    fn keeps_invoices_due_before_issue() {
        let yaml = r"
user: { email: a@b.c, password: x }
customers:
  - { name: Late, email: late@b.c, invoices: [{ number: 1, invoice_date: 0, due_date: -1 }] }
";
        let set = FixtureFile::parse(yaml).unwrap().resolve(day()).unwrap();
        let invoice = set.invoice(InvoiceNumber::new(1)).unwrap();
        assert_eq!(invoice.invoice_date(), day());
        assert_eq!(invoice.due_date(), dates::days_from(day(), -1).unwrap());
        assert!(invoice.is_due_before_issue());
    }
}
