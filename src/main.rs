//! Trade calculator walkthrough.
//!
//! Runs scripted trades through the worksheet, calculator, report and
//! history so the numbers can be eyeballed end to end.
//!
//! `RUST_LOG` controls log output, `TRADEMATH_CONFIG` points at a JSON config
//! and `TRADEMATH_HISTORY_DIR` switches history from memory to disk.

use std::env;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use trademath::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut config = match env::var_os("TRADEMATH_CONFIG") {
        Some(path) => TradeMathConfig::load(&PathBuf::from(path))?,
        None => TradeMathConfig::default(),
    };
    if let Some(dir) = env::var_os("TRADEMATH_HISTORY_DIR") {
        config.history.directory = Some(PathBuf::from(dir));
    }
    config.validate()?;

    println!("Perpetual Futures Trade Calculator");
    println!("Isolated and Cross Margin, Sizing to Risk\n");

    match config.history.directory.clone() {
        Some(dir) => {
            info!(dir = %dir.display(), "using file-backed history");
            let mut history = History::from_config(FileStore::open(dir)?, &config.history);
            run(&config, &mut history);
        }
        None => {
            let mut history = History::from_config(MemoryStore::new(), &config.history);
            run(&config, &mut history);
        }
    }

    println!("\nAll scenarios completed.");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run<S: KeyValueStore>(config: &TradeMathConfig, history: &mut History<S>) {
    scenario_1_reference_trade(config, history);
    scenario_2_leverage_too_high(config);
    scenario_3_localized_input(config);
    scenario_4_cross_margin(config);
    scenario_5_history(history);
}

fn print_summary(result: &CalculationResult) {
    let s = ResultSummary::from_result(result);
    println!("  Side: {}, position size: ${}", result.side, format_number(result.position_size.value(), 2));
    println!("  Margin: {} ({})", s.margin, s.margin_share);
    println!("  Risk: {} ({})", s.risk, s.risk_share);
    println!("  Reward: {} ({})", s.reward, s.reward_share);
    println!("  R:R {} {}, ROE {}", s.rr, s.rr_quality, s.roe);
    println!("  Liquidation: {} ({})", s.liquidation, s.margin_mode);
    if let Some(warning) = &s.warning {
        println!("  WARNING: {}", warning);
    }
    println!();
}

fn reference_form() -> TradeForm {
    TradeForm {
        total_capital: "1000".to_string(),
        max_risk: "2%".to_string(),
        leverage: "10".to_string(),
        entry_price: "100".to_string(),
        stop_loss: "95".to_string(),
        take_profit: "115".to_string(),
        margin_mode: MarginMode::Isolated,
    }
}

/// $1,000 account risking 2% on a 5% stop.
fn scenario_1_reference_trade<S: KeyValueStore>(config: &TradeMathConfig, history: &mut History<S>) {
    println!("Scenario 1: Reference Trade\n");

    let sheet = Worksheet::with_form(reference_form(), config.liquidation.clone());
    match sheet.result() {
        Some(result) => print_summary(result),
        None => println!("  no result\n"),
    }

    if let Some(saved) = sheet.save(history) {
        println!("  Saved as #{}\n", saved.id);
    }
}

/// Same trade at 20x: the stop sits past isolated liquidation.
fn scenario_2_leverage_too_high(config: &TradeMathConfig) {
    println!("Scenario 2: Leverage Too High\n");

    let mut sheet = Worksheet::with_form(reference_form(), config.liquidation.clone());
    if let Some(result) = sheet.set_field(FormField::Leverage, "20") {
        print_summary(result);
    }
}

/// European number formats and an incomplete form.
fn scenario_3_localized_input(config: &TradeMathConfig) {
    println!("Scenario 3: Localized Input\n");

    for raw in ["1.234,56", "1,234.56", "12,5", "12,500", "abc", ""] {
        println!("  {:>10?} -> {}", raw, normalize(raw));
    }
    println!();

    let mut sheet = Worksheet::new(config.liquidation.clone());
    sheet.set_field(FormField::TotalCapital, "25.000,00");
    sheet.set_field(FormField::MaxRisk, "1,5%");
    sheet.set_field(FormField::Leverage, "5");
    sheet.set_field(FormField::EntryPrice, "0,4521");
    println!("  Without a stop loss: {}", if sheet.result().is_some() { "result" } else { "no result" });

    if let Some(result) = sheet.set_field(FormField::StopLoss, "0,4389") {
        print_summary(result);
    }
}

/// Cross margin with a thin account: liquidation lands before the stop.
fn scenario_4_cross_margin(config: &TradeMathConfig) {
    println!("Scenario 4: Cross Margin\n");

    let mut form = reference_form();
    form.total_capital = "10".to_string();
    form.max_risk = "20".to_string();
    form.stop_loss = "50".to_string();
    form.take_profit = String::new();

    let mut sheet = Worksheet::with_form(form, config.liquidation.clone());
    if let Some(result) = sheet.set_margin_mode(MarginMode::Cross) {
        print_summary(result);
    }
}

fn scenario_5_history<S: KeyValueStore>(history: &mut History<S>) {
    println!("Scenario 5: History\n");

    let now = Utc::now();
    let entries = history.list_all();
    println!("  {} saved calculation(s)", entries.len());
    for saved in &entries {
        let card = HistoryEntryView::from_saved(saved, now);
        println!(
            "  #{} entry {} stop {} target {} {} {} {} ({})",
            card.id, card.entry, card.stop_loss, card.target, card.rr, card.size_label, card.size, card.date
        );
    }

    if let Some(newest) = entries.first() {
        let deleted = history.delete(newest.id);
        println!("  Deleted newest: {}, {} left", deleted, history.list_all().len());
    }
}
