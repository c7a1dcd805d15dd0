//! Connection session state tracking.

use std::fmt;

/// Supervisor's view of one connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    /// Absorbing state, entered only on cancellation.
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Created per supervisor loop iteration, destroyed on disconnect or
/// cancellation. Carries the generation counter for log correlation.
#[derive(Debug)]
pub struct ConnectionSession {
    generation: u64,
    state: SessionState,
}

impl ConnectionSession {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            state: SessionState::Disconnected,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transition(&mut self, next: SessionState) {
        if next != self.state {
            tracing::debug!(
                generation = self.generation,
                from = %self.state,
                to = %next,
                "Session state change"
            );
            self.state = next;
        }
    }
}
