//! In-memory aggregates handed to the persistence layer.
//!
//! A customer is persisted together with its invoices, and an invoice together
//! with its line items and deposits. The builders here only hand out an
//! aggregate once all of its children are attached, so the store never sees a
//! half-assembled invoice.

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::Serialize;

use crate::types::{Email, InvoiceNumber, Money, Quantity};

/// The login user and the plaintext password to hash for it.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login email.
    pub email: Email,
    /// Plaintext password; hashed right before the user row is written.
    pub password: SecretString,
}

/// One billable entry on an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl NewLineItem {
    /// `quantity * unit_price`.
    #[must_use]
    pub fn total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A partial payment recorded against an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposit {
    pub amount: Money,
    pub deposit_date: NaiveDate,
    pub note: String,
}

/// An invoice with all of its line items and deposits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    number: InvoiceNumber,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    line_items: Vec<NewLineItem>,
    deposits: Vec<NewDeposit>,
}

impl NewInvoice {
    #[must_use]
    pub const fn number(&self) -> InvoiceNumber {
        self.number
    }

    #[must_use]
    pub const fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Whether the due date falls before the invoice date.
    #[must_use]
    pub fn is_due_before_issue(&self) -> bool {
        self.due_date < self.invoice_date
    }

    #[must_use]
    pub fn line_items(&self) -> &[NewLineItem] {
        &self.line_items
    }

    #[must_use]
    pub fn deposits(&self) -> &[NewDeposit] {
        &self.deposits
    }

    /// Sum of all line item totals.
    #[must_use]
    pub fn total(&self) -> Money {
        self.line_items.iter().map(NewLineItem::total).sum()
    }

    /// Sum of all deposits.
    #[must_use]
    pub fn deposits_total(&self) -> Money {
        self.deposits.iter().map(|d| d.amount).sum()
    }

    /// Invoice total minus deposits. Negative when the customer overpaid.
    ///
    /// Informational only: fixtures may be partially paid, fully paid or
    /// overpaid, and nothing here treats any of those as an error.
    #[must_use]
    pub fn balance_due(&self) -> rust_decimal::Decimal {
        self.total()
            .amount()
            .saturating_sub(self.deposits_total().amount())
    }
}

/// Assembles a [`NewInvoice`].
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    number: InvoiceNumber,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    line_items: Vec<NewLineItem>,
    deposits: Vec<NewDeposit>,
}

impl InvoiceBuilder {
    #[must_use]
    pub const fn new(number: InvoiceNumber, invoice_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            number,
            invoice_date,
            due_date,
            line_items: Vec::new(),
            deposits: Vec::new(),
        }
    }

    #[must_use]
    pub fn line_item(
        mut self,
        description: impl Into<String>,
        quantity: Quantity,
        unit_price: Money,
    ) -> Self {
        self.line_items.push(NewLineItem {
            description: description.into(),
            quantity,
            unit_price,
        });
        self
    }

    #[must_use]
    pub fn deposit(
        mut self,
        amount: Money,
        deposit_date: NaiveDate,
        note: impl Into<String>,
    ) -> Self {
        self.deposits.push(NewDeposit {
            amount,
            deposit_date,
            note: note.into(),
        });
        self
    }

    /// Finish the invoice. Dates are taken as given, even a due date that
    /// precedes the invoice date.
    #[must_use]
    pub fn build(self) -> NewInvoice {
        NewInvoice {
            number: self.number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            line_items: self.line_items,
            deposits: self.deposits,
        }
    }
}

/// A customer with all of its invoices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    name: String,
    email: Email,
    invoices: Vec<NewInvoice>,
}

impl NewCustomer {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn invoices(&self) -> &[NewInvoice] {
        &self.invoices
    }
}

/// Assembles a [`NewCustomer`] from already-built invoices.
#[derive(Debug, Clone)]
pub struct CustomerBuilder {
    name: String,
    email: Email,
    invoices: Vec<NewInvoice>,
}

impl CustomerBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, email: Email) -> Self {
        Self {
            name: name.into(),
            email,
            invoices: Vec::new(),
        }
    }

    #[must_use]
    pub fn invoice(mut self, invoice: NewInvoice) -> Self {
        self.invoices.push(invoice);
        self
    }

    #[must_use]
    pub fn build(self) -> NewCustomer {
        NewCustomer {
            name: self.name,
            email: self.email,
            invoices: self.invoices,
        }
    }
}

/// Row counts per entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixtureCounts {
    pub users: u64,
    pub customers: u64,
    pub invoices: u64,
    pub line_items: u64,
    pub deposits: u64,
}

impl FixtureCounts {
    /// Count the rows one customer aggregate will produce.
    #[must_use]
    pub fn of_customer(customer: &NewCustomer) -> Self {
        let mut counts = Self {
            customers: 1,
            ..Self::default()
        };
        for invoice in customer.invoices() {
            counts.invoices += 1;
            counts.line_items += invoice.line_items().len() as u64;
            counts.deposits += invoice.deposits().len() as u64;
        }
        counts
    }

    /// Field-wise sum.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self {
            users: self.users + other.users,
            customers: self.customers + other.customers,
            invoices: self.invoices + other.invoices,
            line_items: self.line_items + other.line_items,
            deposits: self.deposits + other.deposits,
        }
    }
}

impl std::fmt::Display for FixtureCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} users, {} customers, {} invoices, {} line items, {} deposits",
            self.users, self.customers, self.invoices, self.line_items, self.deposits
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn builds_invoice_with_children_attached() {
        let number = InvoiceNumber::new(2000);
        let invoice = InvoiceBuilder::new(number, ymd(2026, 10, 14), ymd(2026, 10, 19))
            .line_item("Robbin Drawing", Quantity::ONE, money("6000.23"))
            .line_item("Squirrel Drawing", Quantity::new(2).unwrap(), money("2000.98"))
            .deposit(money("2000.98"), ymd(2026, 10, 17), "first")
            .build();

        assert_eq!(invoice.line_items().len(), 2);
        assert_eq!(invoice.deposits().len(), 1);
        assert_eq!(invoice.total(), money("10002.19"));
        assert_eq!(invoice.deposits_total(), money("2000.98"));
        assert_eq!(invoice.balance_due().to_string(), "8001.21");
    }

    #[test]
    fn due_date_may_equal_invoice_date() {
        let day = ymd(2026, 10, 19);
        let invoice = InvoiceBuilder::new(InvoiceNumber::new(1), day, day).build();
        assert!(!invoice.is_due_before_issue());
    }

    #[test]
    fn keeps_due_date_before_invoice_date() {
        let late = ymd(2026, 10, 18);
        let invoice = InvoiceBuilder::new(InvoiceNumber::new(7), ymd(2026, 10, 19), late).build();
        assert_eq!(invoice.due_date(), late);
        assert!(invoice.is_due_before_issue());
    }

    #[test]
    fn overpayment_gives_negative_balance() {
        let invoice = InvoiceBuilder::new(InvoiceNumber::new(3), ymd(2026, 1, 1), ymd(2026, 1, 2))
            .line_item("Sketch", Quantity::ONE, money("10"))
            .deposit(money("12.50"), ymd(2026, 1, 1), "tip included")
            .build();
        assert!(invoice.balance_due().is_sign_negative());
    }

    #[test]
    fn counts_customer_rows() {
        let day = ymd(2026, 5, 5);
        let invoice = InvoiceBuilder::new(InvoiceNumber::new(9), day, day)
            .line_item("A", Quantity::ONE, money("1"))
            .deposit(money("1"), day, "a")
            .deposit(money("1"), day, "b")
            .build();
        let customer = CustomerBuilder::new("Acme", Email::parse("a@acme.jk").unwrap())
            .invoice(invoice)
            .build();

        let counts = FixtureCounts::of_customer(&customer);
        assert_eq!(counts.customers, 1);
        assert_eq!(counts.invoices, 1);
        assert_eq!(counts.line_items, 1);
        assert_eq!(counts.deposits, 2);
        assert_eq!(counts.plus(counts).deposits, 4);
    }
}
