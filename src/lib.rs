// trademath: perpetual futures trade calculator.
// turns capital, risk, leverage and entry/stop/target into position size,
// margin, R:R and an approximate liquidation price with warnings.
// the math is pure; only history touches storage.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Side, MarginMode, Price, Quote, Leverage
//   2.x  normalize.rs: locale-tolerant numeric text to Decimal
//   3.x  sizing.rs: risk amount, stop distance, position size, margin, reward
//   4.x  liquidation.rs: isolated/cross liquidation price, ordered warnings
//   5.x  calculator.rs: TradeInputs -> Option<CalculationResult>
//   6.x  worksheet.rs: caller-owned form state, recalculates on every edit
//   7.x  config.rs: thresholds and history settings
//   8.x  report.rs: display strings for results and history cards
//   9.x  storage.rs: key-value backends (memory, file)
//   9.1  history.rs: saved calculations over a key-value store

// core math
pub mod calculator;
pub mod liquidation;
pub mod normalize;
pub mod sizing;
pub mod types;

// caller-facing state and presentation
pub mod report;
pub mod worksheet;

// integration modules
pub mod config;
pub mod history;
pub mod storage;

// re exports for convenience
pub use calculator::*;
pub use liquidation::*;
pub use normalize::*;
pub use sizing::*;
pub use types::*;
pub use report::{format_number, format_price, format_relative_date, HistoryEntryView, ResultSummary};
pub use worksheet::{FormField, TradeForm, Worksheet};
pub use config::{ConfigError, HistoryConfig, TradeMathConfig};
pub use history::{History, HistoryError, SavedCalculation, DEFAULT_STORAGE_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
