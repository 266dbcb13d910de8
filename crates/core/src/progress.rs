//! Read-path derivations: progress, budget usage, growth, and due labels.

use chrono::{Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::types::Timestamp;

/// Round to the nearest integer with halves going up (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `round(part / whole * 100)`, or 0 when `whole` is not positive.
pub fn percentage(part: f64, whole: f64) -> i64 {
    if whole > 0.0 {
        round_half_up(part / whole * 100.0)
    } else {
        0
    }
}

/// Completed-task ratio as a whole percentage.
pub fn progress(completed_tasks: i64, total_tasks: i64) -> i64 {
    percentage(completed_tasks as f64, total_tasks as f64)
}

/// Spent-over-budget as a whole percentage.
pub fn budget_usage(spent: f64, budget: f64) -> i64 {
    percentage(spent, budget)
}

// ---------------------------------------------------------------------------
// Budget health
// ---------------------------------------------------------------------------

/// Bucket of budget consumption, computed from the unrounded percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetHealth {
    UnderBudget,
    OnTrack,
    Warning,
    Critical,
    OverBudget,
}

pub fn budget_health(spent: f64, budget: f64) -> BudgetHealth {
    let pct = if budget > 0.0 { spent / budget * 100.0 } else { 0.0 };
    match pct {
        p if p >= 100.0 => BudgetHealth::OverBudget,
        p if p >= 90.0 => BudgetHealth::Critical,
        p if p >= 75.0 => BudgetHealth::Warning,
        p if p >= 50.0 => BudgetHealth::OnTrack,
        _ => BudgetHealth::UnderBudget,
    }
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

/// Percentage change from `previous` to `current`.
///
/// With no baseline the result is 100 when there is anything now, else 0.
pub fn growth(current: f64, previous: f64) -> i64 {
    if previous > 0.0 {
        round_half_up((current - previous) / previous * 100.0)
    } else if current > 0.0 {
        100
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Calendar windows
// ---------------------------------------------------------------------------

/// `[first of month, first of next month)` for the month `months_back`
/// months before the one containing `now` (UTC).
pub fn month_window(now: Timestamp, months_back: u32) -> (Timestamp, Timestamp) {
    let total = now.year() * 12 + now.month0() as i32 - months_back as i32;
    let start = first_of_month(total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
    let next = total + 1;
    let end = first_of_month(next.div_euclid(12), next.rem_euclid(12) as u32 + 1);
    (start, end)
}

fn first_of_month(year: i32, month: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Due labels
// ---------------------------------------------------------------------------

/// Human-readable due bucket for a deadline relative to `now`.
///
/// Day counts are the ceiling of the exact difference in days. Only the
/// week bucket is singularised.
pub fn due_info(due: Option<Timestamp>, now: Timestamp) -> String {
    let Some(due) = due else {
        return "No due date".to_string();
    };
    let diff = due - now;
    let days = (diff.num_milliseconds() as f64 / Duration::days(1).num_milliseconds() as f64).ceil() as i64;

    match days {
        d if d < 0 => format!("Overdue by {} days", -d),
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d if d < 7 => format!("Due in {d} days"),
        d => {
            let weeks = (d + 6) / 7;
            let unit = if weeks == 1 { "week" } else { "weeks" };
            format!("Due in {weeks} {unit}")
        }
    }
}
