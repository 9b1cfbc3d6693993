//! The risk calculator: six numbers and a margin mode in, one result out.
//!
//! `calculate` is pure. Incomplete or degenerate input is not an error, it is
//! the absence of a result, so the caller can tell "nothing computed yet"
//! apart from "computed, and the answer is zero".

use crate::liquidation::{assess_liquidation, LiquidationParams, LiquidationWarning, WarningCause, WarningContext};
use crate::sizing::{margin_cost, position_size_for_risk, reward_profile, risk_amount, stop_distance};
use crate::types::{Leverage, MarginMode, Price, Quote, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Canonical inputs for one calculation. Numbers are already normalized;
/// `max_risk` stays raw because `%` changes its meaning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeInputs {
    pub total_capital: Decimal,
    pub max_risk: String,
    pub leverage: Decimal,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    /// Zero means no target.
    pub take_profit: Decimal,
    pub margin_mode: MarginMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub inputs: TradeInputs,
    pub side: Side,
    pub position_size: Quote,
    pub margin_cost: Quote,
    pub risk_amount: Quote,
    pub reward_amount: Quote,
    pub rr_ratio: Decimal,
    pub liquidation_price: Decimal,
    pub warning: Option<LiquidationWarning>,
}

impl CalculationResult {
    pub fn warning_cause(&self) -> Option<WarningCause> {
        self.warning.as_ref().map(LiquidationWarning::cause)
    }

    pub fn has_target(&self) -> bool {
        self.inputs.take_profit > Decimal::ZERO
    }
}

/// Calculates with the default liquidation thresholds.
pub fn calculate(inputs: &TradeInputs) -> Option<CalculationResult> {
    calculate_with_params(inputs, &LiquidationParams::default())
}

pub fn calculate_with_params(
    inputs: &TradeInputs,
    params: &LiquidationParams,
) -> Option<CalculationResult> {
    let max_risk = inputs.max_risk.trim();
    if inputs.total_capital.is_zero()
        || max_risk.is_empty()
        || inputs.leverage.is_zero()
        || inputs.entry_price.is_zero()
        || inputs.stop_loss.is_zero()
    {
        debug!("incomplete trade inputs, no result");
        return None;
    }

    let (Some(entry), Some(stop), Some(leverage)) = (
        Price::new(inputs.entry_price),
        Price::new(inputs.stop_loss),
        Leverage::new(inputs.leverage),
    ) else {
        debug!("negative price or leverage, no result");
        return None;
    };
    if inputs.total_capital < Decimal::ZERO {
        debug!("negative capital, no result");
        return None;
    }
    let total_capital = Quote::new(inputs.total_capital);

    let Some(risk) = risk_amount(total_capital, max_risk) else {
        debug!(max_risk, "risk amount is not positive, no result");
        return None;
    };

    let side = Side::from_entry_and_stop(entry, stop);
    let Some(distance) = stop_distance(entry, stop) else {
        debug!("stop loss equals entry, no result");
        return None;
    };

    let position_size = position_size_for_risk(risk, distance)?;
    let margin = margin_cost(position_size, leverage)?;
    let reward = reward_profile(entry, inputs.take_profit, position_size, distance)?;

    let ctx = WarningContext {
        total_capital,
        position_size,
        margin_cost: margin,
        leverage,
        stop_distance: distance,
    };
    let assessment = assess_liquidation(inputs.margin_mode, entry, side, &ctx, params)?;

    Some(CalculationResult {
        inputs: TradeInputs {
            max_risk: max_risk.to_string(),
            ..inputs.clone()
        },
        side,
        position_size,
        margin_cost: margin,
        risk_amount: risk,
        reward_amount: reward.reward_amount,
        rr_ratio: reward.rr_ratio,
        liquidation_price: assessment.liquidation_price,
        warning: assessment.warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(leverage: Decimal, mode: MarginMode) -> TradeInputs {
        TradeInputs {
            total_capital: dec!(1000),
            max_risk: "2%".to_string(),
            leverage,
            entry_price: dec!(100),
            stop_loss: dec!(95),
            take_profit: dec!(115),
            margin_mode: mode,
        }
    }

    #[test]
    fn isolated_long_reference_trade() {
        let result = calculate(&inputs(dec!(10), MarginMode::Isolated)).unwrap();

        assert_eq!(result.side, Side::Long);
        assert_eq!(result.risk_amount.value(), dec!(20));
        assert_eq!(result.position_size.value(), dec!(400));
        assert_eq!(result.margin_cost.value(), dec!(40));
        assert_eq!(result.reward_amount.value(), dec!(60));
        assert_eq!(result.rr_ratio, dec!(3));
        assert_eq!(result.liquidation_price, dec!(91));
        assert_eq!(result.warning, None);
    }

    #[test]
    fn leverage_too_high_at_20x() {
        let result = calculate(&inputs(dec!(20), MarginMode::Isolated)).unwrap();

        assert_eq!(result.warning_cause(), Some(WarningCause::LeverageTooHigh));
        match result.warning {
            Some(LiquidationWarning::LeverageTooHigh { max_safe_leverage, .. }) => {
                assert_eq!(max_safe_leverage, dec!(18));
            }
            other => panic!("unexpected warning {:?}", other),
        }
        // 0.9 / 20 = 4.5% move
        assert_eq!(result.liquidation_price, dec!(95.5));
    }

    #[test]
    fn short_position() {
        let mut short = inputs(dec!(10), MarginMode::Isolated);
        short.stop_loss = dec!(105);
        short.take_profit = dec!(90);

        let result = calculate(&short).unwrap();
        assert_eq!(result.side, Side::Short);
        assert_eq!(result.position_size.value(), dec!(400));
        assert_eq!(result.rr_ratio, dec!(2));
        assert_eq!(result.liquidation_price, dec!(109));
    }

    #[test]
    fn absolute_risk_amount() {
        let mut trade = inputs(dec!(10), MarginMode::Isolated);
        trade.max_risk = " 50 ".to_string();

        let result = calculate(&trade).unwrap();
        assert_eq!(result.risk_amount.value(), dec!(50));
        assert_eq!(result.position_size.value(), dec!(1000));
        assert_eq!(result.inputs.max_risk, "50");
    }

    #[test]
    fn cross_mode_without_warning() {
        let result = calculate(&inputs(dec!(10), MarginMode::Cross)).unwrap();
        // capital move = 1000 / 400 = 2.5, far beyond the 5% stop
        assert_eq!(result.liquidation_price, dec!(-150));
        assert_eq!(result.warning, None);
    }

    #[test]
    fn cross_mode_liquidates_before_stop() {
        let mut trade = inputs(dec!(10), MarginMode::Cross);
        trade.total_capital = dec!(10);
        trade.max_risk = "8".to_string();
        trade.stop_loss = dec!(50);

        // size = 8 / 0.5 = 16, capital move = 10 / 16 = 0.625 > 0.5
        assert_eq!(calculate(&trade).unwrap().warning, None);

        // size = 20 / 0.5 = 40, capital move = 0.25 <= 0.5
        trade.max_risk = "20".to_string();
        let result = calculate(&trade).unwrap();
        assert_eq!(result.warning_cause(), Some(WarningCause::CrossMarginRisk));
        assert_eq!(result.liquidation_price, dec!(75));
    }

    #[test]
    fn no_target_means_zero_reward() {
        let mut trade = inputs(dec!(10), MarginMode::Isolated);
        trade.take_profit = Decimal::ZERO;

        let result = calculate(&trade).unwrap();
        assert!(!result.has_target());
        assert_eq!(result.reward_amount, Quote::zero());
        assert_eq!(result.rr_ratio, Decimal::ZERO);
    }

    #[test]
    fn incomplete_inputs_yield_nothing() {
        let base = inputs(dec!(10), MarginMode::Isolated);

        let mut t = base.clone();
        t.total_capital = Decimal::ZERO;
        assert!(calculate(&t).is_none());

        let mut t = base.clone();
        t.max_risk = "   ".to_string();
        assert!(calculate(&t).is_none());

        let mut t = base.clone();
        t.leverage = Decimal::ZERO;
        assert!(calculate(&t).is_none());

        let mut t = base.clone();
        t.entry_price = Decimal::ZERO;
        assert!(calculate(&t).is_none());

        let mut t = base;
        t.stop_loss = Decimal::ZERO;
        assert!(calculate(&t).is_none());
    }

    #[test]
    fn degenerate_inputs_yield_nothing() {
        let mut t = inputs(dec!(10), MarginMode::Isolated);
        t.stop_loss = t.entry_price;
        assert!(calculate(&t).is_none());

        let mut t = inputs(dec!(10), MarginMode::Isolated);
        t.max_risk = "0%".to_string();
        assert!(calculate(&t).is_none());

        let mut t = inputs(dec!(10), MarginMode::Isolated);
        t.entry_price = dec!(-100);
        assert!(calculate(&t).is_none());
    }

    #[test]
    fn custom_thresholds() {
        let params = LiquidationParams {
            isolated_loss_threshold: dec!(0.8),
            max_roe_at_stop_percent: dec!(40),
            ..LiquidationParams::default()
        };
        let result = calculate_with_params(&inputs(dec!(10), MarginMode::Isolated), &params).unwrap();
        // roe at stop = 50% >= 40%
        assert_eq!(result.warning_cause(), Some(WarningCause::LeverageTooHigh));
        assert_eq!(result.liquidation_price, dec!(92));
    }
}
