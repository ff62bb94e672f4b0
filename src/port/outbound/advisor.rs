//! Advisory backend port.
//!
//! An advisor turns a pool analysis into a [`Decision`]. Backends differ in
//! which model they call and how they parse its answer; the decision engine
//! treats them all as a black box.

use async_trait::async_trait;

use crate::domain::{ActivePosition, Decision, PoolAnalysis, Strategy};
use crate::error::Result;

/// Source of decisions for one deposit.
///
/// A backend reports failure either by returning an error or by returning a
/// decision with confidence 0 whose reason starts with
/// [`PARSE_FAILURE_MARKER`](crate::domain::decision::PARSE_FAILURE_MARKER).
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Return the advisor name for logging.
    fn name(&self) -> &'static str;

    /// Decide what to do given the pool, the deposit's strategy, and its open
    /// positions (bounds taken from the bounds cache).
    async fn analyze(
        &self,
        analysis: &PoolAnalysis,
        strategy: Strategy,
        positions: &[ActivePosition],
    ) -> Result<Decision>;
}
