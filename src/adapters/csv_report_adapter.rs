//! Tab-delimited CSV report adapter implementing ReportPort.
//!
//! All files share a filename prefix:
//! - `{prefix}_summary.csv`: one row per start year
//! - `{prefix}_for_year_{year}.csv`: yearly trace of one run
//! - `{prefix}_inflation.csv`, `{prefix}_snp_prices.csv`: the loaded history

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::RetireSimError;
use crate::domain::inflation::InflationSeries;
use crate::domain::simulation::SimulationOutcome;
use crate::domain::strategy::YearTrace;
use crate::domain::yearly_price::PriceHistory;
use crate::ports::report_port::ReportPort;
use tracing::debug;

pub struct CsvReportAdapter {
    prefix: String,
}

impl CsvReportAdapter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn summary_path(&self) -> PathBuf {
        PathBuf::from(format!("{}_summary.csv", self.prefix))
    }

    pub fn trace_path(&self, start_year: i32) -> PathBuf {
        PathBuf::from(format!("{}_for_year_{}.csv", self.prefix, start_year))
    }

    pub fn inflation_path(&self) -> PathBuf {
        PathBuf::from(format!("{}_inflation.csv", self.prefix))
    }

    pub fn prices_path(&self) -> PathBuf {
        PathBuf::from(format!("{}_snp_prices.csv", self.prefix))
    }
}

/// Write a header row plus data rows as a tab-delimited file, creating parent
/// directories as needed.
pub fn write_table<S: AsRef<str>>(
    path: &Path,
    headers: &[S],
    rows: &[Vec<String>],
) -> Result<(), RetireSimError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    writer.write_record(headers.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write_summary(&self, outcomes: &[SimulationOutcome]) -> Result<(), RetireSimError> {
        let rows: Vec<Vec<String>> = outcomes.iter().map(SimulationOutcome::cells).collect();
        write_table(&self.summary_path(), &SimulationOutcome::HEADERS, &rows)
    }

    fn write_trace(&self, start_year: i32, rows: &[YearTrace]) -> Result<(), RetireSimError> {
        let rows: Vec<Vec<String>> = rows.iter().map(YearTrace::cells).collect();
        write_table(&self.trace_path(start_year), &YearTrace::HEADERS, &rows)
    }

    fn write_inflation(&self, series: &InflationSeries) -> Result<(), RetireSimError> {
        let rows: Vec<Vec<String>> = series
            .iter()
            .map(|(year, rate)| vec![year.to_string(), format!("{}%", rate * 100.0)])
            .collect();
        write_table(&self.inflation_path(), &["Year", "Inflation %"], &rows)
    }

    fn write_prices(&self, history: &PriceHistory) -> Result<(), RetireSimError> {
        let rows: Vec<Vec<String>> = history
            .iter()
            .map(|p| vec![p.year.to_string(), p.open.to_string(), p.close.to_string()])
            .collect();
        write_table(&self.prices_path(), &["Year", "Open", "Close"], &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::yearly_price::YearlyPrice;
    use tempfile::TempDir;

    fn adapter(dir: &TempDir) -> CsvReportAdapter {
        CsvReportAdapter::new(dir.path().join("out").join("run").display().to_string())
    }

    fn sample_outcomes() -> Vec<SimulationOutcome> {
        vec![
            SimulationOutcome {
                start_year: 1990,
                num_years: 30,
                succeeded: true,
                failure_reason: None,
                ending_nominal_net_worth: Some(4_000_000.0),
                ending_real_net_worth: Some(2_000_000.0),
                realized_inflation_percent: Some(100.0),
                gain_percent: Some(100.0),
            },
            SimulationOutcome {
                start_year: 1966,
                num_years: 30,
                succeeded: false,
                failure_reason: Some("ran short in 1994".into()),
                ending_nominal_net_worth: None,
                ending_real_net_worth: None,
                realized_inflation_percent: None,
                gain_percent: None,
            },
        ]
    }

    #[test]
    fn paths_use_prefix() {
        let adapter = CsvReportAdapter::new("debug/run");
        assert_eq!(adapter.summary_path(), PathBuf::from("debug/run_summary.csv"));
        assert_eq!(
            adapter.trace_path(1973),
            PathBuf::from("debug/run_for_year_1973.csv")
        );
        assert_eq!(adapter.inflation_path(), PathBuf::from("debug/run_inflation.csv"));
        assert_eq!(adapter.prices_path(), PathBuf::from("debug/run_snp_prices.csv"));
    }

    #[test]
    fn write_summary_creates_tab_delimited_file() {
        let dir = TempDir::new().unwrap();
        let adapter = adapter(&dir);
        adapter.write_summary(&sample_outcomes()).unwrap();

        let content = fs::read_to_string(adapter.summary_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Years\tEnd value (real)\tEnd value (nominal)\tGain\tInflation"
        );
        assert_eq!(lines[1], "1990 - 2020\t$2,000,000\t$4,000,000\t100.00%\t100.00%");
        assert_eq!(lines[2], "1966 - 1996\tran short in 1994\t\t\t");
    }

    #[test]
    fn write_trace_per_start_year() {
        let dir = TempDir::new().unwrap();
        let adapter = adapter(&dir);
        let rows = vec![YearTrace {
            year: 2000,
            start_shares: 10_000,
            start_net_worth: 1_000_000.0,
            withdrawal: 40_000.0,
            shares_sold: 400,
            unspent_cash: 0.0,
            start_share_price: 100.0,
            end_share_price: 110.0,
            inflation: 0.05,
            end_shares: 9_600,
            end_net_worth: 1_056_000.0,
        }];
        adapter.write_trace(2000, &rows).unwrap();

        let content = fs::read_to_string(adapter.trace_path(2000)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("year\tstart # shares\t"));
        assert!(lines[1].starts_with("2000\t10000\t$1,000,000\t$40,000\t400\t"));
    }

    #[test]
    fn write_history_tables() {
        let dir = TempDir::new().unwrap();
        let adapter = adapter(&dir);
        let series: InflationSeries = [(1990, 0.05)].into_iter().collect();
        let history: PriceHistory = [YearlyPrice {
            year: 1990,
            open: 353.4,
            close: 330.22,
        }]
        .into_iter()
        .collect();

        adapter.write_inflation(&series).unwrap();
        adapter.write_prices(&history).unwrap();

        let inflation = fs::read_to_string(adapter.inflation_path()).unwrap();
        assert_eq!(inflation, "Year\tInflation %\n1990\t5%\n");
        let prices = fs::read_to_string(adapter.prices_path()).unwrap();
        assert_eq!(prices, "Year\tOpen\tClose\n1990\t353.4\t330.22\n");
    }
}
