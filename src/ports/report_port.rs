//! Report and trace output port.

use crate::domain::error::RetireSimError;
use crate::domain::inflation::InflationSeries;
use crate::domain::simulation::SimulationOutcome;
use crate::domain::strategy::YearTrace;
use crate::domain::yearly_price::PriceHistory;

/// Port for writing simulation results.
///
/// Only the summary is required; the remaining sinks default to no-ops for
/// adapters that have nowhere to put them.
pub trait ReportPort {
    fn write_summary(&self, outcomes: &[SimulationOutcome]) -> Result<(), RetireSimError>;

    /// Yearly trace of the run that started in `start_year`.
    fn write_trace(&self, start_year: i32, rows: &[YearTrace]) -> Result<(), RetireSimError> {
        let _ = (start_year, rows);
        Ok(())
    }

    fn write_inflation(&self, series: &InflationSeries) -> Result<(), RetireSimError> {
        let _ = series;
        Ok(())
    }

    fn write_prices(&self, history: &PriceHistory) -> Result<(), RetireSimError> {
        let _ = history;
        Ok(())
    }
}
