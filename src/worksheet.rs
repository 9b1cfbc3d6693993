//! The trade form a user edits, and the result it currently produces.
//!
//! A `Worksheet` is owned by the caller. Every edit recalculates inline and
//! replaces the current result; there is no shared "current calculation".

use crate::calculator::{calculate_with_params, CalculationResult, TradeInputs};
use crate::history::{History, SavedCalculation};
use crate::liquidation::LiquidationParams;
use crate::normalize::normalize;
use crate::storage::KeyValueStore;
use crate::types::MarginMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    TotalCapital,
    MaxRisk,
    Leverage,
    EntryPrice,
    StopLoss,
    TakeProfit,
}

/// Raw text of every input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeForm {
    pub total_capital: String,
    pub max_risk: String,
    pub leverage: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub margin_mode: MarginMode,
}

impl TradeForm {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::TotalCapital => &self.total_capital,
            FormField::MaxRisk => &self.max_risk,
            FormField::Leverage => &self.leverage,
            FormField::EntryPrice => &self.entry_price,
            FormField::StopLoss => &self.stop_loss,
            FormField::TakeProfit => &self.take_profit,
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::TotalCapital => &mut self.total_capital,
            FormField::MaxRisk => &mut self.max_risk,
            FormField::Leverage => &mut self.leverage,
            FormField::EntryPrice => &mut self.entry_price,
            FormField::StopLoss => &mut self.stop_loss,
            FormField::TakeProfit => &mut self.take_profit,
        };
        *slot = value.into();
    }

    /// Normalizes every numeric field. Max risk is only trimmed.
    pub fn to_inputs(&self) -> TradeInputs {
        TradeInputs {
            total_capital: normalize(&self.total_capital),
            max_risk: self.max_risk.trim().to_string(),
            leverage: normalize(&self.leverage),
            entry_price: normalize(&self.entry_price),
            stop_loss: normalize(&self.stop_loss),
            take_profit: normalize(&self.take_profit),
            margin_mode: self.margin_mode,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    form: TradeForm,
    params: LiquidationParams,
    current: Option<CalculationResult>,
}

impl Worksheet {
    pub fn new(params: LiquidationParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn with_form(form: TradeForm, params: LiquidationParams) -> Self {
        let mut sheet = Self {
            form,
            params,
            current: None,
        };
        sheet.recalculate();
        sheet
    }

    pub fn form(&self) -> &TradeForm {
        &self.form
    }

    /// None until the form holds a complete, non-degenerate trade.
    pub fn result(&self) -> Option<&CalculationResult> {
        self.current.as_ref()
    }

    pub fn can_save(&self) -> bool {
        self.current.is_some()
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Option<&CalculationResult> {
        self.form.set_field(field, value);
        self.recalculate()
    }

    /// Focusing a field that still shows the placeholder `0` clears it.
    /// Returns whether anything changed.
    pub fn clear_placeholder(&mut self, field: FormField) -> bool {
        if self.form.field(field) == "0" {
            self.form.set_field(field, String::new());
            self.recalculate();
            true
        } else {
            false
        }
    }

    pub fn set_margin_mode(&mut self, mode: MarginMode) -> Option<&CalculationResult> {
        self.form.margin_mode = mode;
        self.recalculate()
    }

    /// Clears every input. The margin mode is kept.
    pub fn reset(&mut self) {
        self.form = TradeForm {
            margin_mode: self.form.margin_mode,
            ..TradeForm::default()
        };
        self.current = None;
    }

    pub fn recalculate(&mut self) -> Option<&CalculationResult> {
        self.current = calculate_with_params(&self.form.to_inputs(), &self.params);
        self.current.as_ref()
    }

    /// Saves the current result. None when there is nothing to save or the
    /// store failed.
    pub fn save<S: KeyValueStore>(&self, history: &mut History<S>) -> Option<SavedCalculation> {
        let result = self.current.as_ref()?;
        history.save(result)
    }
}
