//! Application services — use-case implementations.
//!
//! Services receive their collaborators through the shared
//! [`BridgeContext`](crate::context::BridgeContext) and, for the transport,
//! through a generic parameter (constructor injection).

pub mod lifecycle;
pub mod sync_scheduler;
