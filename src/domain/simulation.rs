//! Multi-start-year simulation driver.
//!
//! Each start year gets its own market clock, account and strategy instance;
//! runs share nothing but the read-only history.

use tracing::{debug, info};

use super::account::Account;
use super::error::RetireSimError;
use super::format::dollars;
use super::inflation::InflationSeries;
use super::market::MarketClock;
use super::strategy::{RunStatus, WithdrawalStrategy, YearTrace};
use super::yearly_price::PriceHistory;

pub const DEFAULT_STARTING_CASH: f64 = 1e6;
pub const DEFAULT_NUM_YEARS: u32 = 30;

/// Loaded price and inflation history, shared by every run.
#[derive(Debug, Clone, Default)]
pub struct HistoricalData {
    pub prices: PriceHistory,
    pub inflation: InflationSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub starting_cash: f64,
    pub num_years: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_cash: DEFAULT_STARTING_CASH,
            num_years: DEFAULT_NUM_YEARS,
        }
    }
}

/// Result of one start year. Value fields are `None` when the run depleted.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub start_year: i32,
    pub num_years: u32,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
    pub ending_nominal_net_worth: Option<f64>,
    pub ending_real_net_worth: Option<f64>,
    /// Cumulative inflation over the run, in percent.
    pub realized_inflation_percent: Option<f64>,
    /// Real ending value relative to the starting cash, in percent.
    pub gain_percent: Option<f64>,
}

impl SimulationOutcome {
    pub const HEADERS: [&'static str; 5] = [
        "Years",
        "End value (real)",
        "End value (nominal)",
        "Gain",
        "Inflation",
    ];

    /// Summary cells in [`SimulationOutcome::HEADERS`] order. A depleted run
    /// shows its failure reason in place of the values.
    pub fn cells(&self) -> Vec<String> {
        match (
            self.ending_real_net_worth,
            self.ending_nominal_net_worth,
            self.gain_percent,
            self.realized_inflation_percent,
        ) {
            (Some(real), Some(nominal), Some(gain), Some(inflation)) if self.succeeded => vec![
                self.years_label(),
                dollars(real),
                dollars(nominal),
                format!("{:.2}%", gain),
                format!("{:.2}%", inflation),
            ],
            _ => vec![
                self.years_label(),
                self.failure_reason.clone().unwrap_or_default(),
                String::new(),
                String::new(),
                String::new(),
            ],
        }
    }

    /// `"1990 - 2020"` style label for reports.
    pub fn years_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_year,
            self.start_year + self.num_years as i32
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub outcome: SimulationOutcome,
    pub trace: Vec<YearTrace>,
}

/// Run one simulation per start year, in the order given.
///
/// `make_strategy` is called once per start year so no strategy state leaks
/// between runs. Depletion is recorded in the outcome; missing history and
/// ledger invariant violations abort the whole batch.
pub fn run_simulations<S, F>(
    mut make_strategy: F,
    data: &HistoricalData,
    config: &SimulationConfig,
    start_years: &[i32],
) -> Result<Vec<SimulationRun>, RetireSimError>
where
    S: WithdrawalStrategy,
    F: FnMut() -> S,
{
    let mut runs = Vec::with_capacity(start_years.len());
    for &start_year in start_years {
        let mut strategy = make_strategy();
        runs.push(run_one(&mut strategy, data, config, start_year)?);
    }
    info!(
        "simulated {} start years of {} years each",
        runs.len(),
        config.num_years
    );
    Ok(runs)
}

/// Run a single start year with a fresh clock and account.
pub fn run_one<S: WithdrawalStrategy + ?Sized>(
    strategy: &mut S,
    data: &HistoricalData,
    config: &SimulationConfig,
    start_year: i32,
) -> Result<SimulationRun, RetireSimError> {
    let market = MarketClock::new(&data.prices, &data.inflation, start_year)?;
    let mut account = Account::new(config.starting_cash, market);

    let run = strategy.run(&mut account, start_year, config.num_years)?;

    let outcome = match &run.status {
        RunStatus::Succeeded => {
            let factor = data
                .inflation
                .compounded_factor(start_year, config.num_years)?;
            let nominal = account.net_worth();
            let real = data
                .inflation
                .nominal_to_real(nominal, start_year, config.num_years)?;
            let gain = (real - config.starting_cash) * 100.0 / config.starting_cash;
            debug!(start_year, nominal, real, "{} succeeded", strategy.name());
            SimulationOutcome {
                start_year,
                num_years: config.num_years,
                succeeded: true,
                failure_reason: None,
                ending_nominal_net_worth: Some(nominal),
                ending_real_net_worth: Some(real),
                realized_inflation_percent: Some((factor - 1.0) * 100.0),
                gain_percent: Some(gain),
            }
        }
        RunStatus::Depleted(reason) => {
            debug!(start_year, %reason, "{} depleted", strategy.name());
            SimulationOutcome {
                start_year,
                num_years: config.num_years,
                succeeded: false,
                failure_reason: Some(reason.to_string()),
                ending_nominal_net_worth: None,
                ending_real_net_worth: None,
                realized_inflation_percent: None,
                gain_percent: None,
            }
        }
    };

    Ok(SimulationRun {
        outcome,
        trace: run.trace,
    })
}

/// Every loaded year from which a full `num_years` run has price and
/// inflation data, ascending.
pub fn available_start_years(data: &HistoricalData, num_years: u32) -> Vec<i32> {
    data.prices
        .years()
        .filter(|&start| {
            (start..start + num_years as i32)
                .all(|y| data.prices.contains(y) && data.inflation.contains(y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::{BuyAndHoldStrategy, WithdrawalMode, WithdrawalPolicy};
    use crate::domain::yearly_price::YearlyPrice;
    use approx::assert_relative_eq;

    fn data(rows: &[(i32, f64, f64, f64)]) -> HistoricalData {
        HistoricalData {
            prices: rows
                .iter()
                .map(|&(year, open, close, _)| YearlyPrice { year, open, close })
                .collect(),
            inflation: rows.iter().map(|&(year, _, _, rate)| (year, rate)).collect(),
        }
    }

    fn buy_and_hold(pct: f64) -> impl FnMut() -> BuyAndHoldStrategy {
        move || {
            BuyAndHoldStrategy::new(WithdrawalPolicy {
                spending_percentage: pct,
                mode: WithdrawalMode::FixedReal,
            })
        }
    }

    #[test]
    fn default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.starting_cash, 1_000_000.0);
        assert_eq!(config.num_years, 30);
    }

    #[test]
    fn successful_run_converts_to_real() {
        let data = data(&[(2000, 100.0, 110.0, 0.05)]);
        let config = SimulationConfig {
            starting_cash: 1_000_000.0,
            num_years: 1,
        };

        let runs = run_simulations(buy_and_hold(0.04), &data, &config, &[2000]).unwrap();

        assert_eq!(runs.len(), 1);
        let outcome = &runs[0].outcome;
        assert!(outcome.succeeded);
        assert_eq!(outcome.failure_reason, None);
        assert_eq!(outcome.ending_nominal_net_worth, Some(1_056_000.0));
        assert_relative_eq!(outcome.ending_real_net_worth.unwrap(), 1_056_000.0 / 1.05);
        assert_relative_eq!(outcome.realized_inflation_percent.unwrap(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(
            outcome.gain_percent.unwrap(),
            (1_056_000.0 / 1.05 - 1_000_000.0) * 100.0 / 1_000_000.0
        );
        assert_eq!(outcome.years_label(), "2000 - 2001");
    }

    #[test]
    fn outcome_cells() {
        let outcome = SimulationOutcome {
            start_year: 1990,
            num_years: 30,
            succeeded: true,
            failure_reason: None,
            ending_nominal_net_worth: Some(3_456_789.4),
            ending_real_net_worth: Some(1_500_000.0),
            realized_inflation_percent: Some(130.456),
            gain_percent: Some(50.0),
        };
        assert_eq!(
            outcome.cells(),
            vec!["1990 - 2020", "$1,500,000", "$3,456,789", "50.00%", "130.46%"]
        );

        let failed = SimulationOutcome {
            succeeded: false,
            failure_reason: Some("ran short in 2011".into()),
            ending_nominal_net_worth: None,
            ending_real_net_worth: None,
            realized_inflation_percent: None,
            gain_percent: None,
            ..outcome
        };
        assert_eq!(
            failed.cells(),
            vec!["1990 - 2020", "ran short in 2011", "", "", ""]
        );
    }

    #[test]
    fn depleted_run_has_no_values() {
        let data = data(&[
            (2000, 100.0, 40.0, 0.03),
            (2001, 40.0, 10.0, 0.03),
            (2002, 10.0, 2.0, 0.03),
        ]);
        let config = SimulationConfig {
            starting_cash: 1_000_000.0,
            num_years: 3,
        };

        let runs = run_simulations(buy_and_hold(0.9), &data, &config, &[2000]).unwrap();

        let outcome = &runs[0].outcome;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure_reason.as_deref(), Some("ran short in 2001"));
        assert_eq!(outcome.ending_nominal_net_worth, None);
        assert_eq!(outcome.ending_real_net_worth, None);
        assert_eq!(outcome.realized_inflation_percent, None);
        assert_eq!(outcome.gain_percent, None);
    }

    #[test]
    fn preserves_start_year_order() {
        let data = data(&[
            (2000, 100.0, 100.0, 0.0),
            (2001, 100.0, 100.0, 0.0),
            (2002, 100.0, 100.0, 0.0),
        ]);
        let config = SimulationConfig {
            starting_cash: 10_000.0,
            num_years: 1,
        };

        let runs = run_simulations(buy_and_hold(0.04), &data, &config, &[2002, 2000, 2001]).unwrap();

        let years: Vec<i32> = runs.iter().map(|r| r.outcome.start_year).collect();
        assert_eq!(years, vec![2002, 2000, 2001]);
    }

    #[test]
    fn missing_start_year_propagates() {
        let data = data(&[(2000, 100.0, 100.0, 0.0)]);
        let config = SimulationConfig {
            starting_cash: 10_000.0,
            num_years: 1,
        };

        let err = run_simulations(buy_and_hold(0.04), &data, &config, &[1999]).unwrap_err();
        assert!(err.is_missing_data());
    }

    #[test]
    fn fresh_strategy_per_start_year() {
        let data = data(&[(2000, 100.0, 100.0, 0.0), (2001, 100.0, 100.0, 0.0)]);
        let config = SimulationConfig {
            starting_cash: 10_000.0,
            num_years: 1,
        };
        let mut built = 0;
        let factory = || {
            built += 1;
            BuyAndHoldStrategy::new(WithdrawalPolicy {
                spending_percentage: 0.04,
                mode: WithdrawalMode::FixedReal,
            })
        };

        run_simulations(factory, &data, &config, &[2000, 2001]).unwrap();
        assert_eq!(built, 2);
    }

    #[test]
    fn available_start_years_needs_full_horizon() {
        let data = data(&[
            (2000, 1.0, 1.0, 0.0),
            (2001, 1.0, 1.0, 0.0),
            (2002, 1.0, 1.0, 0.0),
            (2003, 1.0, 1.0, 0.0),
        ]);
        assert_eq!(available_start_years(&data, 2), vec![2000, 2001, 2002]);
        assert_eq!(available_start_years(&data, 4), vec![2000]);
        assert!(available_start_years(&data, 5).is_empty());
    }

    #[test]
    fn available_start_years_needs_inflation() {
        let mut data = data(&[(2000, 1.0, 1.0, 0.0), (2001, 1.0, 1.0, 0.0)]);
        data.inflation = [(2000, 0.01)].into_iter().collect();
        assert_eq!(available_start_years(&data, 1), vec![2000]);
        assert!(available_start_years(&data, 2).is_empty());
    }
}
