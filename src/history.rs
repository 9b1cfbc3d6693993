//! Saved calculation history.
//!
//! All records live as one JSON array under a single storage key, newest
//! first. Numbers are written as JSON numbers at full decimal precision, so a
//! saved record reads back equal to the result it was taken from.
//!
//! The plain methods never surface storage failures: they log and return an
//! empty list, `None` or `false`. The `try_` variants return the cause.

use crate::calculator::CalculationResult;
use crate::config::HistoryConfig;
use crate::storage::{KeyValueStore, StorageError};
use crate::types::MarginMode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "crypto_futures_trademath_history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCalculation {
    /// Millisecond timestamp, strictly increasing within one history.
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_capital: Decimal,
    /// Raw text as typed, `2%` or `20`.
    pub max_risk: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub leverage: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub entry_price: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub stop_loss: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub take_profit: Decimal,
    #[serde(rename = "tradeMode")]
    pub margin_mode: MarginMode,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub position_size: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub margin_cost: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub risk_amount: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub reward_amount: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub rr_ratio: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub liquidation_price: Decimal,
}

impl SavedCalculation {
    pub fn from_result(result: &CalculationResult, id: i64, created_at: DateTime<Utc>) -> Self {
        let inputs = &result.inputs;
        Self {
            id,
            created_at,
            total_capital: inputs.total_capital,
            max_risk: inputs.max_risk.clone(),
            leverage: inputs.leverage,
            entry_price: inputs.entry_price,
            stop_loss: inputs.stop_loss,
            take_profit: inputs.take_profit,
            margin_mode: inputs.margin_mode,
            position_size: result.position_size.value(),
            margin_cost: result.margin_cost.value(),
            risk_amount: result.risk_amount.value(),
            reward_amount: result.reward_amount.value(),
            rr_ratio: result.rr_ratio,
            liquidation_price: result.liquidation_price,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("History payload is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub struct History<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> History<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn from_config(store: S, config: &HistoryConfig) -> Self {
        Self::with_key(store, config.storage_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Most recent first.
    pub fn try_list_all(&self) -> Result<Vec<SavedCalculation>, HistoryError> {
        match self.store.get(&self.key)? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn list_all(&self) -> Vec<SavedCalculation> {
        self.try_list_all().unwrap_or_else(|e| {
            error!(error = %e, key = %self.key, "failed to read calculation history");
            Vec::new()
        })
    }

    /// Saves a copy of `result` stamped with `now`. A corrupt payload is left
    /// untouched and the save fails rather than overwriting it.
    pub fn try_save_at(
        &mut self,
        result: &CalculationResult,
        now: DateTime<Utc>,
    ) -> Result<SavedCalculation, HistoryError> {
        let mut all = self.try_list_all()?;

        // two saves in the same millisecond still get distinct ids
        let newest_id = all.iter().map(|c| c.id).max();
        let id = match newest_id {
            Some(newest) if newest >= now.timestamp_millis() => newest + 1,
            _ => now.timestamp_millis(),
        };

        let saved = SavedCalculation::from_result(result, id, now);
        all.insert(0, saved.clone());
        self.write(&all)?;

        info!(id, total = all.len(), "calculation saved");
        Ok(saved)
    }

    pub fn save_at(&mut self, result: &CalculationResult, now: DateTime<Utc>) -> Option<SavedCalculation> {
        match self.try_save_at(result, now) {
            Ok(saved) => Some(saved),
            Err(e) => {
                error!(error = %e, "failed to save calculation");
                None
            }
        }
    }

    pub fn save(&mut self, result: &CalculationResult) -> Option<SavedCalculation> {
        self.save_at(result, Utc::now())
    }

    /// Returns whether a record with `id` existed.
    pub fn try_delete(&mut self, id: i64) -> Result<bool, HistoryError> {
        let mut all = self.try_list_all()?;
        let before = all.len();
        all.retain(|c| c.id != id);
        let removed = all.len() != before;
        self.write(&all)?;

        if !removed {
            warn!(id, "no saved calculation with this id");
        }
        Ok(removed)
    }

    /// True when storage accepted the write, whether or not `id` existed.
    pub fn delete(&mut self, id: i64) -> bool {
        match self.try_delete(id) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, id, "failed to delete calculation");
                false
            }
        }
    }

    pub fn try_clear_all(&mut self) -> Result<(), HistoryError> {
        self.store.remove(&self.key)?;
        info!("calculation history cleared");
        Ok(())
    }

    pub fn clear_all(&mut self) -> bool {
        match self.try_clear_all() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to clear calculation history");
                false
            }
        }
    }

    fn write(&mut self, all: &[SavedCalculation]) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(all)?;
        self.store.set(&self.key, &payload)?;
        Ok(())
    }
}
