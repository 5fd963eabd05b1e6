//! Money calculation utilities using rust_decimal for precision
//!
//! Totals are computed with `Decimal` and converted to `f64` only for
//! storage and serialization.

use rust_decimal::prelude::*;

/// Monetary values are kept at 2 decimal places, half away from zero
const DECIMAL_PLACES: u32 = 2;

/// Highest accepted unit price
///
/// Keeps every line total and order total well inside `Decimal`'s range.
pub const MAX_UNIT_PRICE: f64 = 10_000_000.0;

/// Convert f64 to Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to cents
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// unit_price * quantity
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Sum of line totals, rounded to cents
pub fn order_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (f64, i64)>,
{
    round_money(
        lines
            .into_iter()
            .map(|(price, qty)| line_total(price, qty))
            .sum(),
    )
}

/// Amount in paisa (1/100 rupee), as Khalti reports it
pub fn to_paisa(amount: f64) -> i64 {
    (round_money(to_decimal(amount)) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or_default()
}

/// Equal at cent precision
pub fn amounts_match(a: f64, b: f64) -> bool {
    round_money(to_decimal(a)) == round_money(to_decimal(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_avoids_float_drift() {
        // 0.1 * 3 in f64 is 0.30000000000000004
        let total = order_total([(0.1, 3), (19.99, 2)]);
        assert_eq!(total, Decimal::new(4028, 2));
        assert_eq!(to_f64(total), 40.28);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(1004, 3)), Decimal::new(100, 2));
    }

    #[test]
    fn test_paisa_conversion() {
        assert_eq!(to_paisa(1250.5), 125_050);
        assert_eq!(to_paisa(0.0), 0);
        assert_eq!(to_paisa(19.99), 1999);
    }

    #[test]
    fn test_amounts_match() {
        assert!(amounts_match(40.28, 40.280000001));
        assert!(!amounts_match(40.28, 40.29));
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(order_total(Vec::<(f64, i64)>::new()), Decimal::ZERO);
    }
}
