//! Virtual sensors — temperature probes and fans.
//!
//! Every virtual sensor is driven by its own read counter, so the sequence of
//! readings is fully deterministic for a given configuration.

mod fan;
mod probe;

pub use fan::VirtualFan;
pub use probe::VirtualProbe;

/// Whether read number `count` (starting at 1) falls on a configured dropout.
pub(crate) fn is_dropout(count: u64, every: Option<u32>) -> bool {
    every.is_some_and(|every| every > 0 && count % u64::from(every) == 0)
}

/// Position of read number `count` within a cycle of `period` reads, in
/// `[0, 1)`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn phase(count: u64, period: u32) -> f64 {
    let period = u64::from(period.max(1));
    (count % period) as f64 / period as f64
}
