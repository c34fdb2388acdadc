//! CSV file history adapter.
//!
//! Prices come from a daily index history (`Date`, `Open`, `Close` columns,
//! extra columns ignored). Inflation comes from a monthly table with a `Year`
//! column and `Jan`..`Dec` columns holding values such as `0.5%`.

use crate::domain::error::RetireSimError;
use crate::domain::inflation::InflationSeries;
use crate::domain::yearly_price::{PriceHistory, PriceSample};
use crate::ports::history_port::HistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub struct CsvHistoryAdapter {
    prices_path: PathBuf,
    inflation_path: PathBuf,
}

impl CsvHistoryAdapter {
    pub fn new(prices_path: PathBuf, inflation_path: PathBuf) -> Self {
        Self {
            prices_path,
            inflation_path,
        }
    }

    fn read(path: &Path) -> Result<String, RetireSimError> {
        fs::read_to_string(path).map_err(|e| {
            error!("failed to read {}: {}", path.display(), e);
            RetireSimError::Io(e)
        })
    }
}

/// Parse daily samples from CSV text.
pub fn parse_price_samples(content: &str) -> Result<Vec<PriceSample>, RetireSimError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers()?.clone();
    let date_col = column(&headers, "Date")?;
    let open_col = column(&headers, "Open")?;
    let close_col = column(&headers, "Close")?;

    let mut samples = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let date_str = field(&record, date_col, "Date", line)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            RetireSimError::Data {
                reason: format!("line {}: invalid date {:?}: {}", line, date_str, e),
            }
        })?;
        let open = number(field(&record, open_col, "Open", line)?, "Open", line)?;
        let close = number(field(&record, close_col, "Close", line)?, "Close", line)?;

        samples.push(PriceSample { date, open, close });
    }

    samples.sort_by_key(|s| s.date);
    Ok(samples)
}

/// Parse a monthly inflation table into yearly rates. Each year's rate is the
/// mean of its parsable monthly cells; years with none are skipped.
pub fn parse_inflation(content: &str) -> Result<InflationSeries, RetireSimError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers()?.clone();
    let year_col = column(&headers, "Year")?;
    let month_cols: Vec<usize> = MONTHS
        .iter()
        .filter_map(|m| column(&headers, m).ok())
        .collect();
    if month_cols.is_empty() {
        return Err(RetireSimError::Data {
            reason: "inflation table has no month columns".into(),
        });
    }

    let mut series = InflationSeries::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let year_str = field(&record, year_col, "Year", line)?;
        let year: i32 = year_str.trim().parse().map_err(|e| RetireSimError::Data {
            reason: format!("line {}: invalid year {:?}: {}", line, year_str, e),
        })?;

        let monthly: Vec<f64> = month_cols
            .iter()
            .filter_map(|&col| record.get(col))
            .filter_map(|cell| cell.trim().trim_end_matches('%').trim().parse::<f64>().ok())
            .collect();

        if monthly.is_empty() {
            warn!(year, "no monthly inflation values, skipping year");
            continue;
        }

        let mean = monthly.iter().sum::<f64>() / monthly.len() as f64;
        series.insert(year, mean / 100.0);
    }
    Ok(series)
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, RetireSimError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| RetireSimError::Data {
            reason: format!("missing {} column", name),
        })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    col: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, RetireSimError> {
    record.get(col).ok_or_else(|| RetireSimError::Data {
        reason: format!("line {}: missing {} value", line, name),
    })
}

fn number(value: &str, name: &str, line: usize) -> Result<f64, RetireSimError> {
    value.trim().parse().map_err(|e| RetireSimError::Data {
        reason: format!("line {}: invalid {} value {:?}: {}", line, name, value, e),
    })
}

impl HistoryPort for CsvHistoryAdapter {
    fn load_prices(&self) -> Result<PriceHistory, RetireSimError> {
        let content = Self::read(&self.prices_path)?;
        let samples = parse_price_samples(&content)?;
        let history = PriceHistory::from_samples(&samples)?;
        info!(
            "loaded {} price samples ({} years) from {}",
            samples.len(),
            history.len(),
            self.prices_path.display()
        );
        Ok(history)
    }

    fn load_inflation(&self) -> Result<InflationSeries, RetireSimError> {
        let content = Self::read(&self.inflation_path)?;
        let series = parse_inflation(&content)?;
        info!(
            "loaded inflation for {} years from {}",
            series.len(),
            self.inflation_path.display()
        );
        Ok(series)
    }
}
