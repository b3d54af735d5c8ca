//! Tolerance helpers for currency amounts.
//!
//! Amounts are exact decimals, but balances are still compared against a
//! one-cent threshold: anything strictly inside `(-0.01, +0.01)` counts as
//! settled.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Absolute threshold below which an amount is treated as zero.
pub const TOLERANCE: Decimal = dec!(0.01);

/// `|amount| < TOLERANCE`.
pub fn is_negligible(amount: Decimal) -> bool {
    amount.abs() < TOLERANCE
}

/// Two amounts differ by less than the tolerance.
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    is_negligible(a - b)
}

/// Strictly above `+TOLERANCE`: the holder is owed money.
pub fn is_credit(amount: Decimal) -> bool {
    amount > TOLERANCE
}

/// Strictly below `-TOLERANCE`: the holder owes money.
pub fn is_debit(amount: Decimal) -> bool {
    amount < -TOLERANCE
}
