//! Position sizing from a fixed risk budget.
//!
//! The stop-loss distance decides the size: a position of notional `N`
//! stopped out at fractional distance `d` loses `N × d`, so the notional that
//! loses exactly the risk budget is `risk / d`. Margin is notional divided by
//! leverage. Reward and R:R follow from the take-profit distance.

use crate::normalize::{normalize, normalize_percent};
use crate::types::{Leverage, Price, Quote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Resolves the raw max-risk text into a quote amount. `2%` is two percent of
/// capital, anything else is an absolute amount. None unless the result is
/// strictly positive.
pub fn risk_amount(total_capital: Quote, max_risk: &str) -> Option<Quote> {
    let risk = match normalize_percent(max_risk) {
        Some(percent) => total_capital.checked_mul(percent)?.checked_div(dec!(100))?,
        None => Quote::new(normalize(max_risk)),
    };

    if risk.is_positive() {
        Some(risk)
    } else {
        None
    }
}

/// Fractional stop distance from entry. None when the stop sits on the entry.
pub fn stop_distance(entry: Price, stop_loss: Price) -> Option<Decimal> {
    let distance = entry.distance_fraction(stop_loss.value())?;
    if distance.is_zero() {
        None
    } else {
        Some(distance)
    }
}

/// Notional such that hitting the stop loses exactly `risk`.
pub fn position_size_for_risk(risk: Quote, stop_distance: Decimal) -> Option<Quote> {
    risk.checked_div(stop_distance)
}

pub fn margin_cost(position_size: Quote, leverage: Leverage) -> Option<Quote> {
    position_size.checked_div(leverage.value())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardProfile {
    pub reward_amount: Quote,
    pub rr_ratio: Decimal,
}

impl RewardProfile {
    /// No target set. Distinct from a target that earns nothing.
    pub fn none() -> Self {
        Self {
            reward_amount: Quote::zero(),
            rr_ratio: Decimal::ZERO,
        }
    }
}

/// Reward at the take-profit and its ratio to the stop distance. A take-profit
/// of zero or below means no target.
pub fn reward_profile(
    entry: Price,
    take_profit: Decimal,
    position_size: Quote,
    stop_distance: Decimal,
) -> Option<RewardProfile> {
    if take_profit <= Decimal::ZERO {
        return Some(RewardProfile::none());
    }

    let target_distance = entry.distance_fraction(take_profit)?;
    Some(RewardProfile {
        reward_amount: position_size.checked_mul(target_distance)?,
        rr_ratio: target_distance.checked_div(stop_distance)?,
    })
}

/// Return on margin, in percent, if the stop is hit.
pub fn roe_at_stop_percent(stop_distance: Decimal, leverage: Leverage) -> Option<Decimal> {
    stop_distance
        .checked_mul(leverage.value())?
        .checked_mul(dec!(100))
}
