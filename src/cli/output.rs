//! Text rendering for command output.

use signal_core::types::{PriceTick, SymbolInfo, SymbolSignal};
use signal_engine::CompoundPlan;

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────────────────";

/// Render indicator results as a fixed-width table.
pub fn signal_table(title: &str, signals: &[SymbolSignal]) -> String {
    let mut s = String::new();

    s.push_str(RULE);
    s.push('\n');
    s.push_str(&format!("  {title}\n"));
    s.push_str(RULE);
    s.push('\n');
    s.push_str(&format!(
        "  {:<14} {:>8} {:>8} {:>14} {:>14} {:<12} {:>8}\n",
        "Symbol", "ADX", "RSI", "EMA50", "EMA200", "Signal", "Strength"
    ));
    s.push_str(THIN_RULE);
    s.push('\n');

    if signals.is_empty() {
        s.push_str("  No matching symbols\n");
    }
    for signal in signals {
        let r = &signal.result;
        s.push_str(&format!(
            "  {:<14} {:>8.2} {:>8.2} {:>14.4} {:>14.4} {:<12} {:>7.0}%\n",
            signal.symbol,
            r.adx,
            r.rsi,
            r.ema50,
            r.ema200,
            r.signal.label(),
            r.strength
        ));
    }

    s
}

/// Render symbol search results with their 24h prices where known.
pub fn search_table(title: &str, symbols: &[SymbolInfo], prices: &[PriceTick]) -> String {
    let mut s = String::new();

    s.push_str(RULE);
    s.push('\n');
    s.push_str(&format!("  {title}\n"));
    s.push_str(RULE);
    s.push('\n');
    s.push_str(&format!(
        "  {:<14} {:<8} {:<6} {:>16} {:>10}\n",
        "Symbol", "Base", "Quote", "Price", "24h"
    ));
    s.push_str(THIN_RULE);
    s.push('\n');

    if symbols.is_empty() {
        s.push_str("  No matching symbols\n");
    }
    for info in symbols {
        let (price, change) = match prices.iter().find(|p| p.symbol == info.symbol) {
            Some(tick) => (
                format!("{:.4}", tick.price),
                format!("{:+.2}%", tick.change_pct),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        s.push_str(&format!(
            "  {:<14} {:<8} {:<6} {:>16} {:>10}\n",
            info.symbol, info.base_asset, info.quote_asset, price, change
        ));
    }

    s
}

/// Render a compounding plan with its summary.
pub fn plan_report(plan: &CompoundPlan) -> String {
    let mut s = String::new();
    let input = plan.input();
    let summary = plan.summary();

    s.push_str(RULE);
    s.push('\n');
    s.push_str("  COMPOUNDING PLAN\n");
    s.push_str(RULE);
    s.push_str("\n\n");

    s.push_str(&format!("  Investment:          ${:.2}\n", input.investment));
    s.push_str(&format!("  Profit per trade:    {}%\n", input.margin_pct));
    s.push_str(&format!("  Trades:              {}\n\n", input.trades));

    s.push_str(&format!(
        "  {:>4}  {:>16} {:>14} {:>16}  {}\n",
        "#", "Start", "Profit", "Total", "Done"
    ));
    s.push_str(THIN_RULE);
    s.push('\n');
    for step in plan.steps() {
        s.push_str(&format!(
            "  {:>4}  {:>16.2} {:>14.2} {:>16.2}  {}\n",
            step.id,
            step.starting_amount,
            step.profit,
            step.total,
            if step.completed { "[x]" } else { "[ ]" }
        ));
    }
    s.push('\n');

    s.push_str("SUMMARY\n");
    s.push_str(THIN_RULE);
    s.push('\n');
    s.push_str(&format!("  Total profit:        ${:.2}\n", summary.total_profit));
    s.push_str(&format!("  Final amount:        ${:.2}\n", summary.final_amount));
    s.push_str(&format!(
        "  Avg profit / trade:  ${:.2}\n",
        summary.profit_per_trade
    ));
    s.push_str(&format!(
        "  Completed:           {}/{}\n",
        summary.completed,
        plan.steps().len()
    ));

    s
}
