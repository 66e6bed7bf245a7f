mod calendar;
mod compare;
mod engine;
mod types;

pub use calendar::{anchor_month, month_label};
pub use compare::{StrategyComparison, compare_strategies};
pub use engine::{BALANCE_EPSILON, MAX_MONTHS, round_to_cents, simulate, simulate_now};
pub use types::{
    ChartPoint, CompletionStatus, Debt, DebtMonthDetail, ExtraPayments, MonthlySnapshot,
    PayoffEvent, PayoffResult, PayoffSummary, Strategy,
};
