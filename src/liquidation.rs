//! Approximate liquidation price and the warnings derived from it.
//!
//! Isolated margin liquidates once losses eat a fixed share of the position's
//! own margin (90% by default), so the liquidation move is that share divided
//! by leverage. Cross margin draws on the whole account, so the position is
//! liquidated once the move has consumed all capital: `capital / notional`.
//!
//! Warnings are advisory. They never block a result, and at most one is
//! attached: checks run in a fixed order and the first match wins.

use crate::report::{format_number, format_price};
use crate::types::{Leverage, MarginMode, Price, Quote, Side};
use crate::sizing::roe_at_stop_percent;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidationParams {
    /// Share of isolated margin lost before liquidation (0.9 = 90%).
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub isolated_loss_threshold: Decimal,
    /// ROE loss at the stop, in percent, from which leverage is flagged.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub max_roe_at_stop_percent: Decimal,
    /// Floor for the suggested safe leverage.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub min_safe_leverage: Decimal,
}

impl Default for LiquidationParams {
    fn default() -> Self {
        Self {
            isolated_loss_threshold: dec!(0.9),
            max_roe_at_stop_percent: dec!(90),
            min_safe_leverage: dec!(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningCause {
    InsufficientMargin,
    LeverageTooHigh,
    CrossMarginRisk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidationWarning {
    /// Margin for the position exceeds the whole account.
    InsufficientMargin { required: Quote, available: Quote },
    /// Stop is far enough that isolated margin is gone before it fills.
    LeverageTooHigh {
        leverage: Leverage,
        max_safe_leverage: Decimal,
    },
    /// Cross liquidation sits between entry and stop.
    CrossMarginRisk { liquidation_price: Decimal },
}

impl LiquidationWarning {
    pub fn cause(&self) -> WarningCause {
        match self {
            LiquidationWarning::InsufficientMargin { .. } => WarningCause::InsufficientMargin,
            LiquidationWarning::LeverageTooHigh { .. } => WarningCause::LeverageTooHigh,
            LiquidationWarning::CrossMarginRisk { .. } => WarningCause::CrossMarginRisk,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LiquidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiquidationWarning::InsufficientMargin { required, available } => write!(
                f,
                "Insufficient margin. Position requires ${} but account only has ${}. \
                 Try widening your SL or reducing your risk.",
                format_number(required.value(), 2),
                format_number(available.value(), 2),
            ),
            LiquidationWarning::LeverageTooHigh { leverage, max_safe_leverage } => write!(
                f,
                "SL is too far for {} leverage. You might get liquidated before SL hits. \
                 Max safe leverage is ~{}x.",
                leverage,
                max_safe_leverage.normalize(),
            ),
            LiquidationWarning::CrossMarginRisk { liquidation_price } => write!(
                f,
                "Cross Margin Risk: Your Stop Loss is further than your liquidation point (${}). \
                 You will be liquidated before SL hits.",
                format_price(*liquidation_price),
            ),
        }
    }
}

/// Everything the warning checks look at for one calculation.
#[derive(Debug, Clone, Copy)]
pub struct WarningContext {
    pub total_capital: Quote,
    pub position_size: Quote,
    pub margin_cost: Quote,
    pub leverage: Leverage,
    pub stop_distance: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidationAssessment {
    /// May be zero or negative when the move needed exceeds 100%, i.e. the
    /// position cannot be liquidated by price alone.
    pub liquidation_price: Decimal,
    pub warning: Option<LiquidationWarning>,
}

type WarningCheck = fn(&WarningContext, &LiquidationParams) -> Option<LiquidationWarning>;

// order matters: insufficient margin outranks the leverage check
const ISOLATED_CHECKS: [WarningCheck; 2] = [insufficient_margin, leverage_too_high];

/// Price reached after moving `fraction` against a position opened at `entry`.
fn price_after_adverse_move(entry: Price, side: Side, fraction: Decimal) -> Option<Decimal> {
    let factor = match side {
        Side::Long => Decimal::ONE.checked_sub(fraction)?,
        Side::Short => Decimal::ONE.checked_add(fraction)?,
    };
    entry.value().checked_mul(factor)
}

pub fn isolated_liquidation_price(
    entry: Price,
    leverage: Leverage,
    side: Side,
    params: &LiquidationParams,
) -> Option<Decimal> {
    let liq_move = params.isolated_loss_threshold.checked_div(leverage.value())?;
    price_after_adverse_move(entry, side, liq_move)
}

/// Fractional move that consumes all capital backing `position_size`.
pub fn cross_capital_move(total_capital: Quote, position_size: Quote) -> Option<Decimal> {
    total_capital.ratio_of(position_size)
}

pub fn cross_liquidation_price(
    entry: Price,
    total_capital: Quote,
    position_size: Quote,
    side: Side,
) -> Option<Decimal> {
    let capital_move = cross_capital_move(total_capital, position_size)?;
    price_after_adverse_move(entry, side, capital_move)
}

/// Highest leverage whose isolated liquidation stays beyond the stop, floored
/// at `params.min_safe_leverage`.
pub fn max_safe_leverage(stop_distance: Decimal, params: &LiquidationParams) -> Option<Decimal> {
    let stop_percent = stop_distance.checked_mul(dec!(100))?;
    let safe = params.max_roe_at_stop_percent.checked_div(stop_percent)?.floor();
    Some(safe.max(params.min_safe_leverage))
}

fn insufficient_margin(ctx: &WarningContext, _params: &LiquidationParams) -> Option<LiquidationWarning> {
    if ctx.margin_cost > ctx.total_capital {
        Some(LiquidationWarning::InsufficientMargin {
            required: ctx.margin_cost,
            available: ctx.total_capital,
        })
    } else {
        None
    }
}

fn leverage_too_high(ctx: &WarningContext, params: &LiquidationParams) -> Option<LiquidationWarning> {
    let roe = roe_at_stop_percent(ctx.stop_distance, ctx.leverage)?;
    if roe < params.max_roe_at_stop_percent {
        return None;
    }
    Some(LiquidationWarning::LeverageTooHigh {
        leverage: ctx.leverage,
        max_safe_leverage: max_safe_leverage(ctx.stop_distance, params)?,
    })
}

pub fn isolated_warning(ctx: &WarningContext, params: &LiquidationParams) -> Option<LiquidationWarning> {
    ISOLATED_CHECKS.iter().find_map(|check| check(ctx, params))
}

/// Cross liquidation precedes the stop when the stop is at least as far as
/// the capital-exhausting move.
pub fn cross_warning(ctx: &WarningContext, liquidation_price: Decimal) -> Option<LiquidationWarning> {
    let capital_move = cross_capital_move(ctx.total_capital, ctx.position_size)?;
    if ctx.stop_distance >= capital_move {
        Some(LiquidationWarning::CrossMarginRisk { liquidation_price })
    } else {
        None
    }
}

/// Liquidation price and warning for `mode`. None only on arithmetic failure.
pub fn assess_liquidation(
    mode: MarginMode,
    entry: Price,
    side: Side,
    ctx: &WarningContext,
    params: &LiquidationParams,
) -> Option<LiquidationAssessment> {
    match mode {
        MarginMode::Isolated => {
            let liquidation_price = isolated_liquidation_price(entry, ctx.leverage, side, params)?;
            Some(LiquidationAssessment {
                liquidation_price,
                warning: isolated_warning(ctx, params),
            })
        }
        MarginMode::Cross => {
            let liquidation_price =
                cross_liquidation_price(entry, ctx.total_capital, ctx.position_size, side)?;
            Some(LiquidationAssessment {
                liquidation_price,
                warning: cross_warning(ctx, liquidation_price),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(capital: Decimal, size: Decimal, leverage: Decimal, distance: Decimal) -> WarningContext {
        let leverage = Leverage::new(leverage).unwrap();
        WarningContext {
            total_capital: Quote::new(capital),
            position_size: Quote::new(size),
            margin_cost: Quote::new(size / leverage.value()),
            leverage,
            stop_distance: distance,
        }
    }

    #[test]
    fn isolated_price_long_and_short() {
        let entry = Price::new_unchecked(dec!(100));
        let leverage = Leverage::new(dec!(10)).unwrap();
        let params = LiquidationParams::default();

        // 0.9 / 10 = 9% move
        assert_eq!(isolated_liquidation_price(entry, leverage, Side::Long, &params), Some(dec!(91)));
        assert_eq!(isolated_liquidation_price(entry, leverage, Side::Short, &params), Some(dec!(109)));
    }

    #[test]
    fn cross_price_uses_whole_capital() {
        let entry = Price::new_unchecked(dec!(100));
        // $500 capital behind $1000 notional = 50% move
        let long = cross_liquidation_price(entry, Quote::new(dec!(500)), Quote::new(dec!(1000)), Side::Long);
        assert_eq!(long, Some(dec!(50)));
        let short = cross_liquidation_price(entry, Quote::new(dec!(500)), Quote::new(dec!(1000)), Side::Short);
        assert_eq!(short, Some(dec!(150)));
    }

    #[test]
    fn cross_price_can_go_negative() {
        let entry = Price::new_unchecked(dec!(100));
        let liq = cross_liquidation_price(entry, Quote::new(dec!(1000)), Quote::new(dec!(400)), Side::Long);
        assert_eq!(liq, Some(dec!(-150)));
    }

    #[test]
    fn safe_leverage_floor() {
        let params = LiquidationParams::default();
        assert_eq!(max_safe_leverage(dec!(0.05), &params), Some(dec!(18)));
        assert_eq!(max_safe_leverage(dec!(0.07), &params), Some(dec!(12)));
        // a 95% stop cannot be held even at 1x, still suggest 1x
        assert_eq!(max_safe_leverage(dec!(0.95), &params), Some(dec!(1)));
    }

    #[test]
    fn no_isolated_warning_when_comfortable() {
        let c = ctx(dec!(1000), dec!(400), dec!(10), dec!(0.05));
        assert_eq!(isolated_warning(&c, &LiquidationParams::default()), None);
    }

    #[test]
    fn leverage_too_high_at_threshold() {
        // 0.05 × 18 × 100 = 90, exactly on the threshold
        let c = ctx(dec!(1000), dec!(400), dec!(18), dec!(0.05));
        let warning = isolated_warning(&c, &LiquidationParams::default()).unwrap();
        assert_eq!(warning.cause(), WarningCause::LeverageTooHigh);

        let c = ctx(dec!(1000), dec!(400), dec!(17), dec!(0.05));
        assert_eq!(isolated_warning(&c, &LiquidationParams::default()), None);
    }

    #[test]
    fn insufficient_margin_outranks_leverage() {
        // margin 5000 > capital 1000, and roe at stop is 100%
        let c = ctx(dec!(1000), dec!(100000), dec!(20), dec!(0.05));
        let warning = isolated_warning(&c, &LiquidationParams::default()).unwrap();
        assert_eq!(warning.cause(), WarningCause::InsufficientMargin);
    }

    #[test]
    fn cross_warning_boundary() {
        // capital move = 100 / 2000 = 0.05, equal to the stop distance
        let c = ctx(dec!(100), dec!(2000), dec!(10), dec!(0.05));
        assert!(cross_warning(&c, dec!(95)).is_some());

        let c = ctx(dec!(101), dec!(2000), dec!(10), dec!(0.05));
        assert!(cross_warning(&c, dec!(94.95)).is_none());
    }

    #[test]
    fn warning_messages() {
        let warning = LiquidationWarning::InsufficientMargin {
            required: Quote::new(dec!(5000)),
            available: Quote::new(dec!(1000)),
        };
        assert_eq!(
            warning.message(),
            "Insufficient margin. Position requires $5,000.00 but account only has $1,000.00. \
             Try widening your SL or reducing your risk."
        );

        let warning = LiquidationWarning::LeverageTooHigh {
            leverage: Leverage::new(dec!(20)).unwrap(),
            max_safe_leverage: dec!(18),
        };
        assert_eq!(
            warning.message(),
            "SL is too far for 20x leverage. You might get liquidated before SL hits. \
             Max safe leverage is ~18x."
        );

        let warning = LiquidationWarning::CrossMarginRisk { liquidation_price: dec!(95) };
        assert_eq!(
            warning.message(),
            "Cross Margin Risk: Your Stop Loss is further than your liquidation point ($95.00). \
             You will be liquidated before SL hits."
        );
    }
}
