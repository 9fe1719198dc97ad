//! Shared UI-facing state of a guard.

/// Phase of the guard as a whole.
///
/// A single call additionally ends up either committed or superseded; a
/// superseded call leaves this state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Nothing issued since construction or the last `reset`.
    Idle,
    /// The latest issued call has not settled yet.
    Pending,
    /// The latest issued call settled and its outcome is visible.
    Committed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallState<R> {
    pub data: Option<R>,
    pub error: Option<String>,
    pub loading: bool,
}

impl<R> Default for CallState<R> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
        }
    }
}

impl<R> CallState<R> {
    pub fn phase(&self) -> CallPhase {
        if self.loading {
            CallPhase::Pending
        } else if self.data.is_some() || self.error.is_some() {
            CallPhase::Committed
        } else {
            CallPhase::Idle
        }
    }
}
