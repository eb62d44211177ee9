use rust_decimal::Decimal;

/// Rounds `value` down to the nearest multiple of `target`.
///
/// Used wherever an order quantity must respect a contract's minimum
/// tradable increment: a request for 7 against an increment of 5 becomes 5,
/// and a request for 3 becomes 0 (which the engine treats as a no-op
/// placement, not an error). A non-positive `target` leaves the value
/// untouched.
pub fn round_down_to(value: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO {
        return value;
    }
    (value / target).floor() * target
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_down_to_increment() {
        assert_eq!(round_down_to(dec!(7), dec!(5)), dec!(5));
        assert_eq!(round_down_to(dec!(3), dec!(5)), dec!(0));
        assert_eq!(round_down_to(dec!(10), dec!(5)), dec!(10));
        assert_eq!(round_down_to(dec!(0.7), dec!(0.2)), dec!(0.6));
    }

    #[test]
    fn zero_increment_is_identity() {
        assert_eq!(round_down_to(dec!(7), dec!(0)), dec!(7));
    }
}
