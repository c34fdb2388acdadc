//! Yearly inflation rates and nominal/real conversion.

use std::collections::BTreeMap;

use super::error::RetireSimError;

/// Annual inflation rate per year, as a fraction (0.03 = 3%).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InflationSeries {
    rates: BTreeMap<i32, f64>,
}

impl InflationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, rate: f64) {
        self.rates.insert(year, rate);
    }

    pub fn rate(&self, year: i32) -> Result<f64, RetireSimError> {
        self.rates
            .get(&year)
            .copied()
            .ok_or(RetireSimError::MissingInflation { year })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.rates.contains_key(&year)
    }

    /// Product of `(1 + rate)` over `[start_year, start_year + num_years)`.
    ///
    /// An empty range yields 1.0. The product is taken in year order so
    /// results are reproducible bit-for-bit.
    pub fn compounded_factor(&self, start_year: i32, num_years: u32) -> Result<f64, RetireSimError> {
        let mut factor = 1.0;
        for year in start_year..start_year + num_years as i32 {
            factor *= 1.0 + self.rate(year)?;
        }
        Ok(factor)
    }

    /// Deflate a nominal amount measured at the end of the period back to
    /// start-of-period purchasing power.
    pub fn nominal_to_real(
        &self,
        amount: f64,
        start_year: i32,
        num_years: u32,
    ) -> Result<f64, RetireSimError> {
        Ok(amount / self.compounded_factor(start_year, num_years)?)
    }

    /// Years with a rate, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.rates.iter().map(|(&year, &rate)| (year, rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(i32, f64)> for InflationSeries {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
