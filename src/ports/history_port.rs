//! Historical data access port.

use crate::domain::error::RetireSimError;
use crate::domain::inflation::InflationSeries;
use crate::domain::simulation::HistoricalData;
use crate::domain::yearly_price::PriceHistory;

pub trait HistoryPort {
    fn load_prices(&self) -> Result<PriceHistory, RetireSimError>;

    fn load_inflation(&self) -> Result<InflationSeries, RetireSimError>;

    /// Default implementation: loads prices, then inflation.
    fn load_all(&self) -> Result<HistoricalData, RetireSimError> {
        Ok(HistoricalData {
            prices: self.load_prices()?,
            inflation: self.load_inflation()?,
        })
    }
}
