//! Domain types and rules shared by the ledger use cases.

mod account_type;
mod amount;
mod date;

pub use account_type::AccountType;
pub use amount::{validate_amount, TransactionKind, MAX_AMOUNT_CENTS};
pub use date::validate_date;

/// Reserved name of the default category seeded by the first migration.
pub const UNCATEGORIZED: &str = "Uncategorized";
