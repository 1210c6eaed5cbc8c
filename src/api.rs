mod client;
pub mod eptr;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{prelude::*, table::PriceTable};

/// Anything that can serve market clearing prices for a date range.
#[async_trait]
pub trait PriceSource: Sync {
    /// Fetch the prices from `since` to `until`, both inclusive.
    ///
    /// Returns [`None`] when the provider answered with something that is not a table.
    async fn get_market_clearing_prices(
        &self,
        since: NaiveDate,
        until: NaiveDate,
        postprocess: bool,
    ) -> Result<Option<PriceTable>>;
}
