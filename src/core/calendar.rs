use chrono::{Datelike, Months, NaiveDate};

/// First day of the month containing `date`.
pub fn anchor_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Label for simulated month `offset`, counted from the anchor's calendar month,
/// e.g. "Mar 2026".
pub fn month_label(anchor: NaiveDate, offset: u32) -> String {
    anchor_month(anchor)
        .checked_add_months(Months::new(offset))
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_default()
}
