//! Push cache lifecycle states

use std::fmt;

/// Lifecycle of a push cache
///
/// `Uninitialized -> Initializing -> Steady`, with `Disposed` reachable from
/// every state and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Built, no load attempted yet
    Uninitialized,
    /// Refresh task running, no load has succeeded yet
    Initializing,
    /// At least one load succeeded; refreshing on the configured period
    Steady,
    /// Background work cancelled
    Disposed,
}

impl RefreshState {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        self == Self::Disposed
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Initializing)
                | (Self::Initializing, Self::Steady)
                | (Self::Uninitialized | Self::Initializing | Self::Steady, Self::Disposed)
        )
    }
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Initializing => write!(f, "Initializing"),
            Self::Steady => write!(f, "Steady"),
            Self::Disposed => write!(f, "Disposed"),
        }
    }
}
