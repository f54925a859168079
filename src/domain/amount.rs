//! Signed cent amounts and the debit/credit label derived from the sign.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Largest accepted magnitude for a single transaction (100 billion in
/// display units). Keeps account sums far away from `i64` overflow.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Debit,
    Credit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Negative is a debit, positive a credit. Zero has no direction.
    pub fn for_amount(amount_cents: i64) -> Option<Self> {
        match amount_cents.signum() {
            -1 => Some(Self::Debit),
            1 => Some(Self::Credit),
            _ => None,
        }
    }
}

/// Reject zero and out-of-range amounts, and a label that contradicts the
/// sign. Returns the label to store.
pub fn validate_amount(
    amount_cents: i64,
    declared: Option<TransactionKind>,
) -> Result<TransactionKind, AppError> {
    let kind = TransactionKind::for_amount(amount_cents)
        .ok_or_else(|| AppError::InvalidInput("amount_cents must be non-zero".into()))?;
    if amount_cents.unsigned_abs() > MAX_AMOUNT_CENTS as u64 {
        return Err(AppError::InvalidInput(format!(
            "amount_cents magnitude exceeds {}",
            MAX_AMOUNT_CENTS
        )));
    }
    if let Some(declared) = declared {
        if declared != kind {
            return Err(AppError::InvalidInput(format!(
                "transaction_type '{}' contradicts amount sign ({})",
                declared.as_str(),
                kind.as_str()
            )));
        }
    }
    Ok(kind)
}
