//! Index price samples and their yearly open/close aggregation.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use super::error::RetireSimError;

/// One dated price sample, as read from a daily history file.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyPrice {
    pub year: i32,
    pub open: f64,
    pub close: f64,
}

impl YearlyPrice {
    /// (close - open) / open
    pub fn growth(&self) -> f64 {
        (self.close - self.open) / self.open
    }
}

/// Yearly prices keyed by calendar year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    years: BTreeMap<i32, YearlyPrice>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a yearly record. Open and close must both be positive.
    pub fn insert(&mut self, price: YearlyPrice) -> Result<(), RetireSimError> {
        if !(price.open > 0.0 && price.close > 0.0) {
            return Err(RetireSimError::Data {
                reason: format!(
                    "non-positive price for {}: open {}, close {}",
                    price.year, price.open, price.close
                ),
            });
        }
        self.years.insert(price.year, price);
        Ok(())
    }

    /// Group samples by calendar year. The earliest-dated sample supplies the
    /// year's open, the latest-dated sample its close.
    pub fn from_samples(samples: &[PriceSample]) -> Result<Self, RetireSimError> {
        let mut bounds: BTreeMap<i32, (&PriceSample, &PriceSample)> = BTreeMap::new();
        for sample in samples {
            let entry = bounds
                .entry(sample.date.year())
                .or_insert((sample, sample));
            if sample.date < entry.0.date {
                entry.0 = sample;
            }
            if sample.date > entry.1.date {
                entry.1 = sample;
            }
        }

        let mut history = Self::new();
        for (year, (first, last)) in bounds {
            history.insert(YearlyPrice {
                year,
                open: first.open,
                close: last.close,
            })?;
        }
        Ok(history)
    }

    pub fn get(&self, year: i32) -> Result<&YearlyPrice, RetireSimError> {
        self.years
            .get(&year)
            .ok_or(RetireSimError::MissingPrice { year })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    /// Yearly records, ascending by year.
    pub fn iter(&self) -> impl Iterator<Item = &YearlyPrice> {
        self.years.values()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

impl FromIterator<YearlyPrice> for PriceHistory {
    /// Collect trusted records without the positivity check. Used for
    /// fixtures; loaders go through [`PriceHistory::insert`].
    fn from_iter<I: IntoIterator<Item = YearlyPrice>>(iter: I) -> Self {
        Self {
            years: iter.into_iter().map(|p| (p.year, p)).collect(),
        }
    }
}
