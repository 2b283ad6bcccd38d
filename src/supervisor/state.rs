//! Supervisor lifecycle states.
//!
//! ```text
//!              RotateRequested
//!  Forwarding ----------------> Rotating
//!      ^  |                        |
//!      |  +-- QueueClosed --> Closed
//!      +---- RotateSucceeded ------+
//!
//!  any non-terminal --(TerminateRequested | Failed)--> Terminated
//! ```

/// Where the supervisor's control loop currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorState {
    /// One active sink; inbound frames are forwarded to it.
    Forwarding,
    /// The active sink is being replaced; forwarding is paused.
    Rotating,
    /// Own queue closed, active sink closed, completion signalled.
    Closed,
    /// The loop ended abruptly on a terminate request or a fatal failure.
    Terminated,
}

/// Input driving [`SupervisorState`] transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    FrameForwarded,
    QueueClosed,
    RotateRequested,
    RotateSucceeded,
    TerminateRequested,
    /// Forwarding, draining or reopening failed.
    Failed,
}

impl SupervisorState {
    /// State reached from `self` after `event`.
    ///
    /// Terminal states absorb every event. Events that make no sense in the
    /// current state leave it unchanged.
    pub fn next(self, event: ControlEvent) -> SupervisorState {
        use ControlEvent::*;
        use SupervisorState::*;

        match (self, event) {
            (Closed | Terminated, _) => self,
            (_, TerminateRequested | Failed) => Terminated,
            (Forwarding, QueueClosed) => Closed,
            (Forwarding, RotateRequested) => Rotating,
            (Rotating, RotateSucceeded) => Forwarding,
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SupervisorState::Closed | SupervisorState::Terminated)
    }
}
