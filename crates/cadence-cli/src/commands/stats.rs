use std::collections::BTreeMap;

use anyhow::Result;
use cadence_core::{aggregate, Period, PeriodTotals, Translator};

use super::common::{get_translator, load_ledger};

pub fn execute(period: &str, json: bool) -> Result<()> {
    let translator = get_translator();
    let period: Period = period.parse()?;
    let ledger = load_ledger(&translator)?;
    let buckets = aggregate(&ledger, period);

    if json {
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }

    if buckets.is_empty() {
        println!("{}", translator.get("cli.stats_empty"));
        return Ok(());
    }

    let period_label = translator.period(period);
    println!(
        "{}",
        translator.format("cli.stats_title", &[("period", &period_label)])
    );
    println!();
    for line in render_rows(&buckets, &translator) {
        println!("{}", line);
    }

    Ok(())
}

fn render_rows(buckets: &BTreeMap<String, PeriodTotals>, translator: &Translator) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<12} {:>8} {:>8} {:>8}",
        translator.get("cli.stats_column_period"),
        translator.get("cli.stats_column_hours"),
        translator.get("cli.stats_column_cycles"),
        translator.get("cli.stats_column_sessions"),
    )];

    let mut total_seconds = 0.0;
    let mut total_cycles = 0.0;
    for (key, totals) in buckets {
        total_seconds += totals.total_seconds;
        total_cycles += totals.total_cycles;
        lines.push(format!(
            "{:<12} {:>8.2} {:>8.2} {:>8}",
            key,
            totals.total_seconds / 3600.0,
            totals.total_cycles,
            totals.sessions,
        ));
    }

    lines.push(String::new());
    lines.push(translator.format(
        "cli.stats_total",
        &[
            ("hours", &format!("{:.2}", total_seconds / 3600.0)),
            ("cycles", &format!("{:.2}", total_cycles)),
        ],
    ));
    lines
}
