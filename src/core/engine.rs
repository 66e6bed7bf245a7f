use std::cmp::Ordering;

use chrono::{Local, NaiveDate};

use super::calendar::month_label;
use super::types::{
    ChartPoint, CompletionStatus, Debt, DebtMonthDetail, ExtraPayments, MonthlySnapshot,
    PayoffEvent, PayoffResult, Strategy,
};

/// Remaining balance at or below which a debt counts as paid off.
pub const BALANCE_EPSILON: f64 = 0.01;
/// Hard stop for runs whose minimums never outpace interest.
pub const MAX_MONTHS: u32 = 1200;

#[derive(Debug)]
struct Account<'a> {
    debt: &'a Debt,
    monthly_rate: f64,
    balance: f64,
    paid_off: bool,
}

impl<'a> Account<'a> {
    fn new(debt: &'a Debt) -> Self {
        Self {
            debt,
            monthly_rate: debt.interest_rate / 100.0 / 12.0,
            balance: debt.balance,
            paid_off: false,
        }
    }

    fn is_open(&self) -> bool {
        self.balance > 0.0
    }

    fn interest_due(&self) -> f64 {
        if self.is_open() {
            self.balance * self.monthly_rate
        } else {
            0.0
        }
    }

    fn minimum_payment(&self, interest: f64) -> MonthPayment {
        if !self.is_open() {
            return MonthPayment::default();
        }
        let payment = self.debt.min_payment.min(self.balance + interest);
        MonthPayment {
            payment,
            principal: (payment - interest).max(0.0),
            interest,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthPayment {
    payment: f64,
    principal: f64,
    interest: f64,
}

impl MonthPayment {
    fn owed_after(self, balance: f64) -> f64 {
        balance + self.interest - self.payment
    }
}

/// Runs [`simulate`] anchored on today's local date.
pub fn simulate_now(
    debts: &[Debt],
    extra: &ExtraPayments,
    fixed_total: bool,
    strategy: Strategy,
) -> Option<PayoffResult> {
    simulate(
        debts,
        extra,
        fixed_total,
        strategy,
        Local::now().date_naive(),
    )
}

/// Steps the active debts month by month until every balance is cleared or
/// [`MAX_MONTHS`] is reached.
///
/// Debts without both a positive balance and a positive minimum payment are
/// ignored. Returns `None` when none remain. Month `n` in the schedule is
/// labelled `n` calendar months after `start`.
pub fn simulate(
    debts: &[Debt],
    extra: &ExtraPayments,
    fixed_total: bool,
    strategy: Strategy,
    start: NaiveDate,
) -> Option<PayoffResult> {
    let mut accounts: Vec<Account<'_>> = debts
        .iter()
        .filter(|debt| debt.is_active())
        .map(Account::new)
        .collect();
    if accounts.is_empty() {
        log::debug!("simulate: no active debts among {} entries", debts.len());
        return None;
    }
    log::debug!(
        "simulate: {} active debts, strategy={strategy:?}, fixed_total={fixed_total}",
        accounts.len()
    );

    let mut schedule = Vec::new();
    let mut payoff_order = Vec::new();
    let mut chart_data = Vec::new();
    let mut total_interest_paid = 0.0;
    let mut month = 0;

    while month < MAX_MONTHS && total_remaining(&accounts) > BALANCE_EPSILON {
        month += 1;
        let snapshot = step_month(
            &mut accounts,
            extra,
            fixed_total,
            strategy,
            month,
            start,
            &mut payoff_order,
        );
        total_interest_paid += snapshot.total_interest;
        chart_data.push(ChartPoint {
            month,
            remaining: round_to_cents(snapshot.total_remaining),
            interest: round_to_cents(total_interest_paid),
        });
        schedule.push(snapshot);
    }

    let status = if total_remaining(&accounts) > BALANCE_EPSILON {
        log::warn!(
            "simulate: balances still open after {MAX_MONTHS} months ({:.2} remaining)",
            total_remaining(&accounts)
        );
        CompletionStatus::DidNotConverge
    } else {
        CompletionStatus::Completed
    };
    log::debug!("simulate: finished after {month} months, interest={total_interest_paid:.2}");

    Some(PayoffResult {
        status,
        total_months: month,
        total_interest_paid: round_to_cents(total_interest_paid),
        payoff_date: month_label(start, month),
        payoff_order,
        schedule,
        chart_data,
    })
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn total_remaining(accounts: &[Account<'_>]) -> f64 {
    accounts.iter().map(|account| account.balance).sum()
}

fn step_month(
    accounts: &mut [Account<'_>],
    extra: &ExtraPayments,
    fixed_total: bool,
    strategy: Strategy,
    month: u32,
    start: NaiveDate,
    payoff_order: &mut Vec<PayoffEvent>,
) -> MonthlySnapshot {
    let date = month_label(start, month);

    let mut extra_available = scheduled_extra(extra, month);
    if fixed_total {
        extra_available += freed_minimums(accounts);
    }

    let mut payments: Vec<MonthPayment> = accounts
        .iter()
        .map(|account| account.minimum_payment(account.interest_due()))
        .collect();
    let extra_unallocated = distribute_extra(accounts, &mut payments, strategy, extra_available);

    let mut details = Vec::with_capacity(accounts.len());
    let mut total_payment = 0.0;
    let mut total_interest = 0.0;
    for (account, paid) in accounts.iter_mut().zip(&payments) {
        let opening = account.balance;
        account.balance = paid.owed_after(opening).max(0.0);
        total_payment += paid.payment;
        total_interest += paid.interest;

        if opening > 0.0 && account.balance <= BALANCE_EPSILON && !account.paid_off {
            account.paid_off = true;
            payoff_order.push(PayoffEvent {
                name: account.debt.name.clone(),
                month,
                date: date.clone(),
            });
        }

        details.push(DebtMonthDetail {
            id: account.debt.id.clone(),
            name: account.debt.name.clone(),
            payment: paid.payment,
            principal: paid.principal,
            interest: paid.interest,
            remaining_balance: account.balance,
        });
    }

    MonthlySnapshot {
        month,
        date,
        debts: details,
        total_payment,
        total_remaining: total_remaining(accounts),
        total_interest,
        extra_available,
        extra_unallocated,
    }
}

fn scheduled_extra(extra: &ExtraPayments, month: u32) -> f64 {
    let mut amount = extra.per_month;
    if month == extra.one_time_month {
        amount += extra.one_time;
    }
    if month % 12 == 0 {
        amount += extra.per_year;
    }
    amount
}

fn freed_minimums(accounts: &[Account<'_>]) -> f64 {
    accounts
        .iter()
        .filter(|account| !account.is_open())
        .map(|account| account.debt.min_payment)
        .sum()
}

fn priority(strategy: Strategy, left: &Account<'_>, right: &Account<'_>) -> Ordering {
    match strategy {
        Strategy::Avalanche => right.monthly_rate.total_cmp(&left.monthly_rate),
        Strategy::Snowball => left.balance.total_cmp(&right.balance),
    }
}

/// Pours `pool` into open debts in strategy order, clearing each before moving
/// on. Returns whatever is left once every debt is covered.
fn distribute_extra(
    accounts: &[Account<'_>],
    payments: &mut [MonthPayment],
    strategy: Strategy,
    pool: f64,
) -> f64 {
    let mut order: Vec<usize> = (0..accounts.len())
        .filter(|&index| accounts[index].is_open())
        .collect();
    // sort_by is stable, so ties keep input order
    order.sort_by(|&a, &b| priority(strategy, &accounts[a], &accounts[b]));

    let mut pool = pool;
    for index in order {
        if pool <= 0.0 {
            break;
        }
        let paid = &mut payments[index];
        let owed = paid.owed_after(accounts[index].balance);
        if owed <= 0.0 {
            continue;
        }
        let applied = pool.min(owed);
        paid.payment += applied;
        paid.principal += applied;
        pool -= applied;
    }
    pool
}
