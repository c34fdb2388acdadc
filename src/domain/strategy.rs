//! Withdrawal strategies.
//!
//! A [`WithdrawalStrategy`] drives one simulated retirement: it trades and
//! spends through an [`Account`] and advances the account's market clock one
//! year at a time. [`BuyAndHoldStrategy`] is the reference policy.

use std::fmt;

use tracing::{Level, debug, warn};

use super::account::Account;
use super::error::RetireSimError;
use super::format::{dollars, dollars_cents, percent, render_table};

/// How the yearly withdrawal amount is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalMode {
    /// A fixed share of the starting portfolio, grown each year by inflation.
    FixedReal,
    /// A fixed share of the portfolio's value at the start of each year.
    PercentOfPortfolio,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalPolicy {
    /// Fraction withdrawn, e.g. 0.04 for 4%.
    pub spending_percentage: f64,
    pub mode: WithdrawalMode,
}

/// Why a run stopped before reaching its horizon.
#[derive(Debug, Clone, PartialEq)]
pub enum DepletionReason {
    /// Not enough shares left to fund the year's withdrawal.
    RanShort { year: i32 },
    /// Shares were sold but the cash still did not cover the withdrawal.
    FailedToSpend { year: i32 },
}

impl fmt::Display for DepletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepletionReason::RanShort { year } => write!(f, "ran short in {}", year),
            DepletionReason::FailedToSpend { .. } => write!(f, "failed to spend cash"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Succeeded,
    Depleted(DepletionReason),
}

impl RunStatus {
    pub fn succeeded(&self) -> bool {
        matches!(self, RunStatus::Succeeded)
    }
}

/// One simulated year, captured after the withdrawal and the move to year end.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTrace {
    pub year: i32,
    pub start_shares: u64,
    pub start_net_worth: f64,
    pub withdrawal: f64,
    pub shares_sold: u64,
    pub unspent_cash: f64,
    pub start_share_price: f64,
    pub end_share_price: f64,
    pub inflation: f64,
    pub end_shares: u64,
    pub end_net_worth: f64,
}

impl YearTrace {
    pub const HEADERS: [&'static str; 11] = [
        "year",
        "start # shares",
        "start net worth (nominal)",
        "withdrawal",
        "shares sold",
        "unspent cash",
        "start share price",
        "end share price",
        "inflation %",
        "end # shares",
        "end net worth (nominal)",
    ];

    /// Display cells in [`YearTrace::HEADERS`] order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.start_shares.to_string(),
            dollars(self.start_net_worth),
            dollars(self.withdrawal),
            self.shares_sold.to_string(),
            dollars(self.unspent_cash),
            dollars_cents(self.start_share_price),
            dollars_cents(self.end_share_price),
            percent(self.inflation),
            self.end_shares.to_string(),
            dollars(self.end_net_worth),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    pub status: RunStatus,
    pub trace: Vec<YearTrace>,
}

pub trait WithdrawalStrategy {
    fn name(&self) -> &str;

    /// Simulate `num_years` years starting at `start_year`. The account's
    /// clock must sit at the start of `start_year`.
    ///
    /// Depletion is reported through [`RunStatus`]; errors are reserved for
    /// missing history and ledger invariant violations.
    fn run(
        &mut self,
        account: &mut Account<'_>,
        start_year: i32,
        num_years: u32,
    ) -> Result<StrategyRun, RetireSimError>;
}

/// Invest everything on day one, then sell just enough each year to fund the
/// withdrawal.
#[derive(Debug, Clone)]
pub struct BuyAndHoldStrategy {
    policy: WithdrawalPolicy,
}

impl BuyAndHoldStrategy {
    pub fn new(policy: WithdrawalPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &WithdrawalPolicy {
        &self.policy
    }
}

impl WithdrawalStrategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "buy and hold"
    }

    fn run(
        &mut self,
        account: &mut Account<'_>,
        start_year: i32,
        num_years: u32,
    ) -> Result<StrategyRun, RetireSimError> {
        debug!(
            "simulating {} - {}",
            start_year,
            start_year + num_years as i32
        );
        let spending = self.policy.spending_percentage;

        let mut fixed_real_withdrawal = account.cash_available() * spending;

        let price = account.market().current_price();
        let mut affordable = (account.cash_available() / price).floor() as u64;
        if affordable as f64 * price > account.cash_available() {
            affordable = affordable.saturating_sub(1);
        }
        account.buy_stock(affordable)?;

        let end_year = start_year + num_years as i32;
        let mut trace = Vec::with_capacity(num_years as usize);
        let mut status = RunStatus::Succeeded;

        for year in start_year..end_year {
            let start_shares = account.shares_owned();
            let start_net_worth = account.net_worth();
            let start_share_price = account.market().current_price();

            let withdrawal = match self.policy.mode {
                WithdrawalMode::FixedReal => fixed_real_withdrawal,
                WithdrawalMode::PercentOfPortfolio => start_net_worth * spending,
            };

            // Round up so the sale always covers the withdrawal.
            let shortfall = withdrawal - account.cash_available();
            let shares_to_sell = (shortfall / start_share_price).ceil().max(0.0) as u64;

            if !account.sell_stock(shares_to_sell) {
                status = RunStatus::Depleted(DepletionReason::RanShort { year });
                debug!("depleted: {}", DepletionReason::RanShort { year });
                break;
            }

            if !account.spend_cash(withdrawal) {
                warn!(
                    year,
                    withdrawal,
                    cash = account.cash_available(),
                    "cash short after covering sale"
                );
                status = RunStatus::Depleted(DepletionReason::FailedToSpend { year });
                break;
            }

            account.market_mut().advance_to_year_end();
            let inflation = account.market().current_inflation()?;

            trace.push(YearTrace {
                year,
                start_shares,
                start_net_worth,
                withdrawal,
                shares_sold: shares_to_sell,
                unspent_cash: account.cash_available(),
                start_share_price,
                end_share_price: account.market().current_price(),
                inflation,
                end_shares: account.shares_owned(),
                end_net_worth: account.net_worth(),
            });

            // Withdrawn at the start of the year, so this year's inflation
            // applies to next year's amount.
            fixed_real_withdrawal *= 1.0 + inflation;

            if year + 1 < end_year {
                account.market_mut().advance_to_next_year()?;
            }
        }

        if let Some(table) = debug_trace_table(&trace) {
            debug!("\n{}", table);
        }

        Ok(StrategyRun { status, trace })
    }
}

/// The trace as a text table, or `None` when debug events would be dropped.
fn debug_trace_table(trace: &[YearTrace]) -> Option<String> {
    if !tracing::enabled!(Level::DEBUG) {
        return None;
    }
    let rows: Vec<Vec<String>> = trace.iter().map(YearTrace::cells).collect();
    Some(render_table(&YearTrace::HEADERS, &rows))
}
