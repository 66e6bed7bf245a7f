use chrono::NaiveDate;
use serde::Serialize;

use super::engine::{round_to_cents, simulate};
use super::types::{CompletionStatus, Debt, ExtraPayments, PayoffSummary, Strategy};

/// Avalanche and snowball run side by side on identical inputs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: PayoffSummary,
    pub snowball: PayoffSummary,
    /// Snowball interest minus avalanche interest; negative when snowball is cheaper.
    pub interest_saved_by_avalanche: f64,
    /// Snowball months minus avalanche months.
    pub months_saved_by_avalanche: i64,
    pub recommended: Strategy,
}

pub fn compare_strategies(
    debts: &[Debt],
    extra: &ExtraPayments,
    fixed_total: bool,
    start: NaiveDate,
) -> Option<StrategyComparison> {
    let avalanche = simulate(debts, extra, fixed_total, Strategy::Avalanche, start)?.summary();
    let snowball = simulate(debts, extra, fixed_total, Strategy::Snowball, start)?.summary();

    let interest_saved_by_avalanche =
        round_to_cents(snowball.total_interest_paid - avalanche.total_interest_paid);
    let months_saved_by_avalanche = i64::from(snowball.total_months) - i64::from(avalanche.total_months);
    let recommended = recommend(&avalanche, &snowball);
    log::debug!(
        "compare: avalanche {}m/{:.2}, snowball {}m/{:.2}, recommending {recommended:?}",
        avalanche.total_months,
        avalanche.total_interest_paid,
        snowball.total_months,
        snowball.total_interest_paid
    );

    Some(StrategyComparison {
        avalanche,
        snowball,
        interest_saved_by_avalanche,
        months_saved_by_avalanche,
        recommended,
    })
}

fn recommend(avalanche: &PayoffSummary, snowball: &PayoffSummary) -> Strategy {
    let converged = |s: &PayoffSummary| s.status == CompletionStatus::Completed;
    match (converged(avalanche), converged(snowball)) {
        (true, false) => return Strategy::Avalanche,
        (false, true) => return Strategy::Snowball,
        _ => {}
    }

    let by_interest = snowball
        .total_interest_paid
        .total_cmp(&avalanche.total_interest_paid);
    let by_months = snowball.total_months.cmp(&avalanche.total_months);
    if by_interest.then(by_months).is_lt() {
        Strategy::Snowball
    } else {
        Strategy::Avalanche
    }
}
