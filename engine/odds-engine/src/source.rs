//! Source adapter capability
//!
//! Every upstream (odds API or sportsbook scraper) implements
//! [`SourceAdapter`]. The aggregator consumes them as a priority-ordered list.

use async_trait::async_trait;

use crate::error::OddsResult;
use crate::model::League;
use crate::raw::RawPayload;

/// Fetches raw odds data from one upstream
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short name used in logs, errors and the direct scrape endpoint
    fn name(&self) -> &str;

    /// Fetch the raw payload for a league.
    ///
    /// Network, timeout and auth failures are reported as
    /// `OddsError::UpstreamUnavailable`; undecodable bodies as
    /// `OddsError::MalformedUpstreamData`.
    async fn fetch_raw(&self, league: League) -> OddsResult<RawPayload>;
}
