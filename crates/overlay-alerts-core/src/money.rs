//! Currency formatting helper for alert amounts.
//!
//! Amounts arrive as opaque strings from the webhook side and are passed
//! through untouched; only the currency presentation is decided here.

/// Symbol table for currencies where prefixing a symbol reads naturally.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("GBP", "\u{a3}"),
    ("EUR", "\u{20ac}"),
    ("JPY", "\u{a5}"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
    ("NZD", "NZ$"),
    ("INR", "\u{20b9}"),
    ("KRW", "\u{20a9}"),
];

/// Format an amount + currency pair for display.
///
/// Returns `None` when no amount is present; the renderer substitutes its
/// own placeholder. Unknown currency codes fall back to `"<amount> <CODE>"`,
/// and a missing currency yields the bare amount.
#[must_use]
pub fn format_money(amount: Option<&str>, currency: Option<&str>) -> Option<String> {
    let amount = amount.map(str::trim).filter(|a| !a.is_empty())?;

    let Some(code) = currency.map(str::trim).filter(|c| !c.is_empty()) else {
        return Some(amount.to_string());
    };

    let code_upper = code.to_ascii_uppercase();
    let symbol = CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| *c == code_upper)
        .map(|(_, s)| *s);

    Some(symbol.map_or_else(
        || format!("{amount} {code_upper}"),
        |symbol| format!("{symbol}{amount}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currencies_use_symbols() {
        assert_eq!(format_money(Some("3.00"), Some("USD")).as_deref(), Some("$3.00"));
        assert_eq!(format_money(Some("5"), Some("gbp")).as_deref(), Some("\u{a3}5"));
        assert_eq!(format_money(Some("10.50"), Some("EUR")).as_deref(), Some("\u{20ac}10.50"));
    }

    #[test]
    fn unknown_currency_falls_back_to_code_suffix() {
        assert_eq!(
            format_money(Some("42.00"), Some("SEK")).as_deref(),
            Some("42.00 SEK")
        );
    }

    #[test]
    fn missing_currency_yields_bare_amount() {
        assert_eq!(format_money(Some("7.77"), None).as_deref(), Some("7.77"));
        assert_eq!(format_money(Some("7.77"), Some("  ")).as_deref(), Some("7.77"));
    }

    #[test]
    fn missing_amount_yields_none() {
        assert_eq!(format_money(None, Some("USD")), None);
        assert_eq!(format_money(Some("   "), Some("USD")), None);
    }
}
