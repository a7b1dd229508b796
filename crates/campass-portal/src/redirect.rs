//! Bounded redirect chains.
//!
//! Automatic redirect following is disabled on the shared transport
//! because `Location` headers carry protocol state here (tickets, tokens,
//! cookie-setting hops). Chains that still have to be walked to completion
//! are driven through [`RedirectChain`], which makes budget exhaustion a
//! checked transition rather than a loop guard.

use url::Url;

use crate::error::{PortalError, PortalResult};

/// Outcome of feeding one response's `Location` header into the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStep {
    /// The chain continues at this absolute URL.
    Continue(Url),
    /// The response carried no `Location`; the chain is complete.
    Settled,
    /// The hop budget is spent with the chain still redirecting.
    Exhausted,
}

/// A redirect chain with a fixed hop budget.
///
/// One `advance` call corresponds to one request made against the current
/// target. The chain settles when a response carries no `Location`, and is
/// exhausted when the budget-th request still redirects.
#[derive(Debug)]
pub struct RedirectChain {
    current: Url,
    budget: usize,
    hops: usize,
}

impl RedirectChain {
    /// Starts a chain at the given absolute URL.
    pub fn new(start: &str, budget: usize) -> PortalResult<Self> {
        let current = Url::parse(start).map_err(|e| {
            PortalError::invalid_response(format!("redirect target is not a URL: {}", start))
                .with_source(e)
        })?;
        Ok(Self {
            current,
            budget,
            hops: 0,
        })
    }

    /// Current chain target.
    pub fn current(&self) -> &Url {
        &self.current
    }

    /// Requests made so far.
    pub fn hops(&self) -> usize {
        self.hops
    }

    /// Advances with the `Location` header returned by the current target.
    ///
    /// Relative locations resolve against the current target.
    pub fn advance(&mut self, location: Option<&str>) -> PortalResult<ChainStep> {
        self.hops += 1;
        let Some(location) = location else {
            return Ok(ChainStep::Settled);
        };
        if self.hops >= self.budget {
            return Ok(ChainStep::Exhausted);
        }
        let next = self.current.join(location).map_err(|e| {
            PortalError::invalid_response(format!("unparseable redirect target: {}", location))
                .with_source(e)
        })?;
        self.current = next.clone();
        Ok(ChainStep::Continue(next))
    }
}
