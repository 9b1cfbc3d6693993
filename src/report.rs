//! User-facing strings for results and history entries.
//!
//! None of this feeds back into the math. It exists so every front end shows
//! the same figures: en-US grouping, prices with 2, 4 or 6 decimals depending
//! on magnitude, one-decimal percentages.

use crate::calculator::CalculationResult;
use crate::history::SavedCalculation;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Rounds half away from zero to exactly `decimals` places and groups the
/// integer part with commas. `1234.5` at 2 is `1,234.50`. A value that
/// rounds to zero never carries a minus sign.
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Price precision tiers: 2 decimals from 1 up, 4 from 0.01, 6 below.
pub fn format_price(value: Decimal) -> String {
    if value >= Decimal::ONE {
        format_number(value, 2)
    } else if value >= dec!(0.01) {
        format_number(value, 4)
    } else {
        format_number(value, 6)
    }
}

/// Fixed decimals without grouping, like a percentage readout.
fn format_fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

fn percent_of(part: Decimal, whole: Decimal) -> String {
    let pct = part
        .checked_div(whole)
        .and_then(|r| r.checked_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO);
    format_fixed(pct, 1)
}

/// `Today`, `Yesterday`, `N days ago` within a week, else `Mon D`.
/// Days are whole 24h periods and the `Mon D` form is the UTC calendar date.
pub fn format_relative_date(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_milliseconds().div_euclid(86_400_000);
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        _ => created_at.format("%b %-d").to_string(),
    }
}

/// What the results panel shows for one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub margin: String,
    pub margin_share: String,
    pub risk: String,
    pub risk_share: String,
    pub reward: String,
    pub reward_share: String,
    pub rr: String,
    pub rr_quality: &'static str,
    pub roe: String,
    pub liquidation: String,
    pub margin_mode: &'static str,
    pub warning: Option<String>,
}

impl ResultSummary {
    pub fn from_result(result: &CalculationResult) -> Self {
        let capital = result.inputs.total_capital;
        let margin = result.margin_cost.value();
        let risk = result.risk_amount.value();
        let reward = result.reward_amount.value();

        let roe = if margin > Decimal::ZERO {
            percent_of(reward, margin)
        } else {
            "0".to_string()
        };

        Self {
            margin: format!("${}", format_number(margin, 2)),
            margin_share: format!("{}% of bal", percent_of(margin, capital)),
            risk: format!("-${}", format_number(risk, 2)),
            risk_share: format!("{}% of bal", percent_of(risk, capital)),
            reward: format!("+${}", format_number(reward, 2)),
            reward_share: format!("{}% gain", percent_of(reward, capital)),
            rr: format!("1:{}", format_fixed(result.rr_ratio, 2)),
            rr_quality: if result.rr_ratio >= dec!(2) { "Good Ratio" } else { "Low Ratio" },
            roe: format!("{roe}%"),
            liquidation: format!("${}", format_price(result.liquidation_price)),
            margin_mode: result.inputs.margin_mode.label(),
            warning: result.warning.as_ref().map(|w| w.message()),
        }
    }
}

/// One card in the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntryView {
    pub id: i64,
    pub entry: String,
    pub stop_loss: String,
    pub target: String,
    pub rr: String,
    pub size_label: String,
    pub size: String,
    pub date: String,
}

impl HistoryEntryView {
    pub fn from_saved(saved: &SavedCalculation, now: DateTime<Utc>) -> Self {
        let target = if saved.take_profit.is_zero() {
            "-".to_string()
        } else {
            format!("${}", format_price(saved.take_profit))
        };
        let rr = if saved.rr_ratio.is_zero() {
            "0R".to_string()
        } else {
            format!("{}R", format_fixed(saved.rr_ratio, 2))
        };

        Self {
            id: saved.id,
            entry: format!("${}", format_price(saved.entry_price)),
            stop_loss: format!("${}", format_price(saved.stop_loss)),
            target,
            rr,
            size_label: format!("Size ({}x)", saved.leverage.normalize()),
            size: format!("${}", format_number(saved.position_size, 0)),
            date: format_relative_date(saved.created_at, now),
        }
    }
}
