// 1.0: primitives shared by the calculator. side, margin mode, price, quote, leverage.
// each is a newtype so the compiler catches a price passed where an amount belongs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Direction implied by where the stop sits. A stop below entry is a long.
    pub fn from_entry_and_stop(entry: Price, stop: Price) -> Self {
        if entry.value() > stop.value() {
            Side::Long
        } else {
            Side::Short
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

// 1.1: isolated = loss bounded by the position's own margin. cross = whole account backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    #[default]
    Isolated,
    Cross,
}

impl MarginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginMode::Isolated => "isolated",
            MarginMode::Cross => "cross",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarginMode::Isolated => "Isolated Margin",
            MarginMode::Cross => "Cross Margin",
        }
    }
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 1.2: price in quote currency per unit of base. must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value > Decimal::ZERO);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// |self - other| as a fraction of self. 100 -> 95 is 0.05.
    pub fn distance_fraction(&self, other: Decimal) -> Option<Decimal> {
        (self.0 - other).abs().checked_div(self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: quote currency amount. capital, risk, margin, notional, reward all use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quote(Decimal);

impl Quote {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn checked_mul(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn checked_div(&self, divisor: Decimal) -> Option<Self> {
        self.0.checked_div(divisor).map(Self)
    }

    /// self as a fraction of `whole`. None when `whole` is zero.
    pub fn ratio_of(&self, whole: Quote) -> Option<Decimal> {
        self.0.checked_div(whole.0)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Quote {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quote {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

// 1.4: leverage multiplier. nominally >= 1x but any positive value is accepted,
// a fractional leverage just means margin above notional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leverage(Decimal);

impl Leverage {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Leverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_from_stop_placement() {
        let entry = Price::new_unchecked(dec!(100));
        assert_eq!(Side::from_entry_and_stop(entry, Price::new_unchecked(dec!(95))), Side::Long);
        assert_eq!(Side::from_entry_and_stop(entry, Price::new_unchecked(dec!(105))), Side::Short);
    }

    #[test]
    fn price_rejects_non_positive() {
        assert!(Price::new(dec!(0)).is_none());
        assert!(Price::new(dec!(-1)).is_none());
        assert!(Price::new(dec!(0.0001)).is_some());
    }

    #[test]
    fn price_distance_is_fractional() {
        let entry = Price::new_unchecked(dec!(100));
        assert_eq!(entry.distance_fraction(dec!(95)), Some(dec!(0.05)));
        assert_eq!(entry.distance_fraction(dec!(115)), Some(dec!(0.15)));
    }

    #[test]
    fn leverage_must_be_positive() {
        let lev_10x = Leverage::new(dec!(10)).unwrap();
        assert_eq!(lev_10x.to_string(), "10x");

        assert!(Leverage::new(dec!(0)).is_none());
        assert!(Leverage::new(dec!(0.5)).is_some());
    }

    #[test]
    fn margin_mode_wire_names() {
        assert_eq!(serde_json::to_string(&MarginMode::Cross).unwrap(), "\"cross\"");
        let mode: MarginMode = serde_json::from_str("\"isolated\"").unwrap();
        assert_eq!(mode, MarginMode::Isolated);
        assert_eq!(MarginMode::Cross.label(), "Cross Margin");
    }

    #[test]
    fn quote_ratio() {
        let part = Quote::new(dec!(40));
        assert_eq!(part.ratio_of(Quote::new(dec!(1000))), Some(dec!(0.04)));
        assert_eq!(part.ratio_of(Quote::zero()), None);
    }
}
