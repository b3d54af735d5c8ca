use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code of an event.
///
/// Every expense inherits its event's currency, and balances are never
/// netted across two different codes.
///
/// # Examples
///
/// ```
/// use split_ledger::core::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("EUR");
/// let usd = CurrencyCode::new("USD");
/// assert_ne!(eur, usd);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Renders an amount for display. The engine itself never formats amounts;
/// this is the seam presentation code plugs into.
pub trait CurrencyFormat {
    fn format(&self, amount: Decimal, currency: &CurrencyCode) -> String;

    /// Balance rendering with an explicit sign in front of the symbol:
    /// `+€12.50`, `-€3.00`.
    fn format_signed(&self, amount: Decimal, currency: &CurrencyCode) -> String {
        let text = self.format(amount.abs(), currency);
        if amount.is_sign_negative() && !amount.is_zero() {
            format!("-{}", text)
        } else {
            format!("+{}", text)
        }
    }
}

/// Symbol table formatter: `$12.50`, `€12.50`, `12.50zł`, `12.50₴`,
/// and `12.50 GBP` for codes without a known symbol.
///
/// # Examples
///
/// ```
/// use split_ledger::core::currency::{CurrencyCode, CurrencyFormat, SymbolFormat};
/// use rust_decimal_macros::dec;
///
/// let text = SymbolFormat.format(dec!(12.5), &CurrencyCode::new("eur"));
/// assert_eq!(text, "€12.50");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolFormat;

impl SymbolFormat {
    fn symbol(code: &str) -> Option<(&'static str, bool)> {
        // (symbol, placed after the amount)
        match code {
            "USD" => Some(("$", false)),
            "EUR" => Some(("€", false)),
            "UAH" => Some(("₴", true)),
            "PLN" => Some(("zł", true)),
            _ => None,
        }
    }
}

impl CurrencyFormat for SymbolFormat {
    fn format(&self, amount: Decimal, currency: &CurrencyCode) -> String {
        let code = currency.as_str().to_uppercase();
        let value = amount.round_dp(2);
        match Self::symbol(&code) {
            Some((sign, true)) => format!("{:.2}{}", value, sign),
            Some((sign, false)) => format!("{}{:.2}", sign, value),
            None => format!("{:.2} {}", value, currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_code_equality() {
        let a = CurrencyCode::new("EUR");
        let b = CurrencyCode::new("EUR");
        assert_eq!(a, b);
        assert_eq!(CurrencyCode::default().as_str(), "USD");
    }

    #[test]
    fn test_prefix_symbols() {
        assert_eq!(SymbolFormat.format(dec!(5), &CurrencyCode::new("USD")), "$5.00");
        assert_eq!(SymbolFormat.format(dec!(1.005), &CurrencyCode::new("EUR")), "€1.00");
    }

    #[test]
    fn test_suffix_symbols() {
        assert_eq!(SymbolFormat.format(dec!(20), &CurrencyCode::new("PLN")), "20.00zł");
        assert_eq!(SymbolFormat.format(dec!(99.9), &CurrencyCode::new("uah")), "99.90₴");
    }

    #[test]
    fn test_signed_puts_sign_before_symbol() {
        let eur = CurrencyCode::new("EUR");
        assert_eq!(SymbolFormat.format_signed(dec!(-80), &eur), "-€80.00");
        assert_eq!(SymbolFormat.format_signed(dec!(12.5), &eur), "+€12.50");
        assert_eq!(SymbolFormat.format_signed(dec!(-3), &CurrencyCode::new("PLN")), "-3.00zł");
        assert_eq!(SymbolFormat.format_signed(Decimal::ZERO, &eur), "+€0.00");
    }

    #[test]
    fn test_unknown_code_falls_back_to_code() {
        assert_eq!(SymbolFormat.format(dec!(7.25), &CurrencyCode::new("GBP")), "7.25 GBP");
    }
}
