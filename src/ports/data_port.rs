//! Historical bar data port.

use crate::domain::error::PapertraderError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Bars for `symbol`, ascending by date.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, PapertraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, PapertraderError>;
}
