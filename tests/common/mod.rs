#![allow(dead_code)]

use retiresim::domain::error::RetireSimError;
use retiresim::domain::inflation::InflationSeries;
use retiresim::domain::simulation::{HistoricalData, SimulationConfig, SimulationOutcome};
use retiresim::domain::strategy::{
    BuyAndHoldStrategy, WithdrawalMode, WithdrawalPolicy, YearTrace,
};
use retiresim::domain::yearly_price::{PriceHistory, YearlyPrice};
use retiresim::ports::history_port::HistoryPort;
use retiresim::ports::report_port::ReportPort;
use std::cell::RefCell;

pub struct MockHistoryPort {
    pub prices: PriceHistory,
    pub inflation: InflationSeries,
    pub error: Option<String>,
}

impl MockHistoryPort {
    pub fn new(data: HistoricalData) -> Self {
        Self {
            prices: data.prices,
            inflation: data.inflation,
            error: None,
        }
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl HistoryPort for MockHistoryPort {
    fn load_prices(&self) -> Result<PriceHistory, RetireSimError> {
        if let Some(reason) = &self.error {
            return Err(RetireSimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.prices.clone())
    }

    fn load_inflation(&self) -> Result<InflationSeries, RetireSimError> {
        Ok(self.inflation.clone())
    }
}

/// Captures everything a report would receive.
#[derive(Default)]
pub struct RecordingReport {
    pub summaries: RefCell<Vec<Vec<SimulationOutcome>>>,
    pub traces: RefCell<Vec<(i32, Vec<YearTrace>)>>,
    pub inflation_writes: RefCell<usize>,
    pub price_writes: RefCell<usize>,
}

impl ReportPort for RecordingReport {
    fn write_summary(&self, outcomes: &[SimulationOutcome]) -> Result<(), RetireSimError> {
        self.summaries.borrow_mut().push(outcomes.to_vec());
        Ok(())
    }

    fn write_trace(&self, start_year: i32, rows: &[YearTrace]) -> Result<(), RetireSimError> {
        self.traces.borrow_mut().push((start_year, rows.to_vec()));
        Ok(())
    }

    fn write_inflation(&self, _series: &InflationSeries) -> Result<(), RetireSimError> {
        *self.inflation_writes.borrow_mut() += 1;
        Ok(())
    }

    fn write_prices(&self, _history: &PriceHistory) -> Result<(), RetireSimError> {
        *self.price_writes.borrow_mut() += 1;
        Ok(())
    }
}

/// Build history from `(year, open, close, inflation)` rows.
pub fn history(rows: &[(i32, f64, f64, f64)]) -> HistoricalData {
    let mut prices = PriceHistory::new();
    for &(year, open, close, _) in rows {
        prices.insert(YearlyPrice { year, open, close }).unwrap();
    }
    HistoricalData {
        prices,
        inflation: rows.iter().map(|&(year, _, _, rate)| (year, rate)).collect(),
    }
}

/// `count` years from `start_year`, price compounding by `growth` each year
/// with constant `inflation`.
pub fn steady_history(start_year: i32, count: usize, growth: f64, inflation: f64) -> HistoricalData {
    let mut price = 100.0;
    let rows: Vec<(i32, f64, f64, f64)> = (0..count)
        .map(|i| {
            let open = price;
            let close = open * (1.0 + growth);
            price = close;
            (start_year + i as i32, open, close, inflation)
        })
        .collect();
    history(&rows)
}

pub fn policy(spending_percentage: f64, mode: WithdrawalMode) -> WithdrawalPolicy {
    WithdrawalPolicy {
        spending_percentage,
        mode,
    }
}

pub fn buy_and_hold(spending_percentage: f64, mode: WithdrawalMode) -> impl FnMut() -> BuyAndHoldStrategy {
    move || BuyAndHoldStrategy::new(policy(spending_percentage, mode))
}

pub fn sim_config(starting_cash: f64, num_years: u32) -> SimulationConfig {
    SimulationConfig {
        starting_cash,
        num_years,
    }
}
