// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

/// A transition was rejected because it is invalid for the session's
/// current state. Never fatal: the session is told what to do instead and
/// nothing is mutated or logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Confirm without a name and a positive duration.
    NotConfigured,

    /// Confirm on a timer that is already counting down.
    AlreadyRunning,

    /// Stop with no live timer in the session.
    NothingToStop,

    /// Free text while no timer is being configured.
    OutOfProtocol,

    /// Duration text that is not a positive whole number of minutes.
    InvalidDuration,

    /// Blank text offered as a name.
    EmptyName,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::NotConfigured => write!(f, "timer is not configured"),
            TransitionError::AlreadyRunning => write!(f, "timer is already running"),
            TransitionError::NothingToStop => write!(f, "no active timer"),
            TransitionError::OutOfProtocol => write!(f, "unexpected text input"),
            TransitionError::InvalidDuration => write!(f, "invalid duration"),
            TransitionError::EmptyName => write!(f, "empty timer name"),
        }
    }
}

impl std::error::Error for TransitionError {}
