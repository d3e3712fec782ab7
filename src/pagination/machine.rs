//! Run-state machine of the page plugin

/// Phase of the pagination runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Editor not ready yet
    #[default]
    Disabled,
    /// Waiting for the next committed change
    Idle,
    /// Measuring the page under the selection
    Measuring,
    /// An intent was recorded; the reflow engine runs next
    Reflowing,
    /// Pagination is suspended (composition, fast typing)
    Suspended,
}

/// Inputs driving the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The editor finished initializing
    Ready,
    /// A document change was committed
    ChangeCommitted,
    /// A measurement finished; `intent` is true if reflow is needed
    Measured { intent: bool },
    /// The reflow pass ended (with or without a transformation)
    ReflowFinished,
    /// Pagination was suspended
    Suspend,
    /// Pagination was resumed
    Resume,
}

impl Phase {
    /// Pure transition function
    pub fn next(self, event: PhaseEvent) -> Phase {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Disabled, Ready) => Idle,
            (Disabled, _) => Disabled,
            (_, Suspend) => Suspended,
            (Suspended, Resume) => Idle,
            (Suspended, _) => Suspended,
            (Idle, ChangeCommitted) => Measuring,
            (Measuring, Measured { intent: true }) => Reflowing,
            (Measuring, Measured { intent: false }) => Idle,
            (Reflowing, ReflowFinished) => Idle,
            // A new change while reflow is pending restarts measurement
            (Reflowing, ChangeCommitted) => Measuring,
            (phase, _) => phase,
        }
    }

    /// Check if a measurement may start from this phase
    pub fn accepts_changes(self) -> bool {
        matches!(self, Phase::Idle | Phase::Reflowing)
    }
}
