//! Year-stepped market clock.
//!
//! The clock sits at either the start or the end of a simulated year. Trades
//! price at the open while at [`Phase::Start`] and at the close while at
//! [`Phase::End`].

use super::error::RetireSimError;
use super::inflation::InflationSeries;
use super::yearly_price::{PriceHistory, YearlyPrice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    End,
}

#[derive(Debug, Clone)]
pub struct MarketClock<'a> {
    prices: &'a PriceHistory,
    inflation: &'a InflationSeries,
    current: YearlyPrice,
    phase: Phase,
}

impl<'a> MarketClock<'a> {
    /// Place the clock at the start of `start_year`.
    pub fn new(
        prices: &'a PriceHistory,
        inflation: &'a InflationSeries,
        start_year: i32,
    ) -> Result<Self, RetireSimError> {
        let current = *prices.get(start_year)?;
        Ok(Self {
            prices,
            inflation,
            current,
            phase: Phase::Start,
        })
    }

    pub fn current_year(&self) -> i32 {
        self.current.year
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_price(&self) -> f64 {
        match self.phase {
            Phase::Start => self.current.open,
            Phase::End => self.current.close,
        }
    }

    /// Nominal growth of the index over the whole current year, whatever the
    /// phase.
    pub fn current_year_growth(&self) -> f64 {
        self.current.growth()
    }

    pub fn current_inflation(&self) -> Result<f64, RetireSimError> {
        self.inflation.rate(self.current.year)
    }

    /// Move from the start to the end of the current year. Returns `false`
    /// and leaves the clock untouched if it is already at the end.
    pub fn advance_to_year_end(&mut self) -> bool {
        if self.phase == Phase::End {
            return false;
        }
        self.phase = Phase::End;
        true
    }

    /// Move to the start of the following year. Fails without moving if the
    /// loaded history has no price for that year.
    pub fn advance_to_next_year(&mut self) -> Result<(), RetireSimError> {
        self.current = *self.prices.get(self.current.year + 1)?;
        self.phase = Phase::Start;
        Ok(())
    }
}
