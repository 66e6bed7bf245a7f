use serde::Serialize;

/// Order in which surplus money is pointed at the remaining debts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Highest interest rate first.
    Avalanche,
    /// Lowest remaining balance first.
    Snowball,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    Completed,
    DidNotConverge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub min_payment: f64,
    /// Nominal annual rate in percent, e.g. 18.99.
    pub interest_rate: f64,
}

impl Debt {
    pub fn is_active(&self) -> bool {
        self.balance > 0.0 && self.min_payment > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtraPayments {
    pub per_month: f64,
    /// Applied on every month where `month % 12 == 0`.
    pub per_year: f64,
    pub one_time: f64,
    /// 1-based month the one-time amount lands in. Zero never fires.
    pub one_time_month: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMonthDetail {
    pub id: String,
    pub name: String,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySnapshot {
    pub month: u32,
    pub date: String,
    pub debts: Vec<DebtMonthDetail>,
    pub total_payment: f64,
    pub total_remaining: f64,
    pub total_interest: f64,
    pub extra_available: f64,
    pub extra_unallocated: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffEvent {
    pub name: String,
    pub month: u32,
    pub date: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub month: u32,
    pub remaining: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResult {
    pub status: CompletionStatus,
    pub total_months: u32,
    pub total_interest_paid: f64,
    pub payoff_date: String,
    pub payoff_order: Vec<PayoffEvent>,
    pub schedule: Vec<MonthlySnapshot>,
    pub chart_data: Vec<ChartPoint>,
}

impl PayoffResult {
    pub fn final_remaining(&self) -> f64 {
        self.schedule
            .last()
            .map(|snapshot| snapshot.total_remaining)
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> PayoffSummary {
        PayoffSummary {
            status: self.status,
            total_months: self.total_months,
            years: self.total_months / 12,
            months: self.total_months % 12,
            total_interest_paid: self.total_interest_paid,
            payoff_date: self.payoff_date.clone(),
        }
    }
}

/// Headline numbers for a run, with the horizon split into years and months.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    pub status: CompletionStatus,
    pub total_months: u32,
    pub years: u32,
    pub months: u32,
    pub total_interest_paid: f64,
    pub payoff_date: String,
}
