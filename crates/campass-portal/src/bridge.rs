//! ServiceBridge trait definition.
//!
//! Downstream campus services (the academic system, the payment system)
//! do not share a login protocol, only a shape: redeem the authenticated
//! identity-provider session for service-local state, reporting protocol
//! rejection as `false`. [`ServiceBridge`] is that shape.

use std::future::Future;
use std::pin::Pin;

use crate::error::PortalResult;
use crate::session::CasSession;

/// A boxed future for async trait methods, keeping the trait usable with
/// dynamic dispatch.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A downstream service that can be entered with the identity-provider
/// session.
pub trait ServiceBridge: Send + Sync {
    /// Short service name used in logs and errors.
    fn service_name(&self) -> &str;

    /// Whether this instance has completed its bridge.
    fn is_authenticated(&self) -> bool;

    /// Carries the authenticated session into the service.
    ///
    /// `Ok(false)` covers every protocol-level failure: a hop with the
    /// wrong status, a missing `Location`, a spent hop budget, a missing
    /// ticket or token. `Err` means the transport itself failed.
    fn authenticate_by_cas<'a>(
        &'a mut self,
        session: &'a CasSession,
    ) -> BoxFuture<'a, PortalResult<bool>>;
}
