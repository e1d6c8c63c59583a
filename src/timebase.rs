//! Time source used by the sequencer and the supervisor

use embassy_time::Instant;

/// Monotonic clock with an async wait
///
/// The firmware implements this over `embassy_time::Timer`; host tests use a
/// simulated clock that advances on every wait.
#[allow(async_fn_in_trait)]
pub trait Timebase {
    /// Current time
    fn now(&self) -> Instant;

    /// Return once `deadline` has been reached
    async fn wait_until(&mut self, deadline: Instant);
}
