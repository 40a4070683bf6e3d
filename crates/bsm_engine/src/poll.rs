//! Poll scheduler: rate-gated status requests.

use contracts::{Channel, Command};
use serde::Serialize;

/// Poll bookkeeping of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollState {
    /// Cycle of the most recent poll (diagnostics only)
    pub last_poll_cycle: Option<u64>,
}

/// Decide whether `channel` is polled this cycle
///
/// Only called while the channel session is active.
pub fn decide_poll(
    channel: Channel,
    state: &mut PollState,
    cycle_index: u64,
    poll_period: u64,
    phase_offset: u64,
) -> Option<Command> {
    if poll_period == 0 || cycle_index % poll_period != phase_offset {
        return None;
    }
    state.last_poll_cycle = Some(cycle_index);
    Some(Command::Poll(channel))
}
