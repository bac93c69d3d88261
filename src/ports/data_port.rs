//! Price-history port trait.

use crate::domain::error::BandtraderError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Daily bars for `symbol` with `start <= date < end`, oldest first.
    ///
    /// An empty vector means the source has nothing for that range; callers
    /// turn it into `DataUnavailable`.
    fn fetch(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, BandtraderError>;
}
