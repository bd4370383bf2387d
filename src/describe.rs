//! Human-readable count summaries, e.g.
//! `"120 cases total, 5 cases today (+4.35%), 30 cases this week (+33.33%)"`.

use crate::models::Metric;
use crate::stats::DataSet;

/// Describe the totals, today's increase and this week's increase of one metric.
///
/// Percentages are relative to the total before the period; a zero pre-period total
/// renders as `no previous`. A case series with a single point only reports its total.
pub fn count_description(data: &DataSet, metric: Metric) -> String {
    let tally = data.tally(metric);
    let total = format!("{} {} total", tally.total, noun(metric, tally.total));
    if metric == Metric::Cases && data.len() == 1 {
        return total;
    }
    format!(
        "{total}, {} {} today ({}), {} {} this week ({})",
        tally.today,
        noun(metric, tally.today),
        growth_percent(tally.total, tally.today),
        tally.this_week,
        noun(metric, tally.this_week),
        growth_percent(tally.total, tally.this_week),
    )
}

/// Singular exactly when `count == 1`.
pub fn noun(metric: Metric, count: u64) -> &'static str {
    let (one, many) = metric.nouns();
    if count == 1 { one } else { many }
}

/// `+x.xx%` growth of `increase` over `total - increase`.
pub fn growth_percent(total: u64, increase: u64) -> String {
    let before = total.saturating_sub(increase);
    if before == 0 {
        "no previous".to_string()
    } else {
        format!("+{:.2}%", increase as f64 * 100.0 / before as f64)
    }
}
