use async_trait::async_trait;
use ethers::types::U256;

use crate::error::ChainResult;
use crate::types::ResponseSpec;

/// Produces the ideal gas price for a response at the moment it is queued.
/// May be stateful or adaptive; the engine treats it as a black box and
/// calls it once per obligation.
#[async_trait]
pub trait FeeEstimator: Send + Sync {
    /// Estimate the gas price the given response should offer.
    async fn estimate(&self, response: &ResponseSpec) -> ChainResult<U256>;
}
