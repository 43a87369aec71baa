// Author: Dustin Pilgrim
// License: MIT

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::task::AbortHandle;

use crate::core::error::TransitionError;

/// Process-unique id of one timer lifecycle.
///
/// A countdown carries the id of the timer that scheduled it and only ever
/// stops that exact instance, never a newer timer in the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Handle of the scheduled auto-expiry task of a running timer.
#[derive(Debug, Clone)]
pub struct Countdown(Arc<AbortHandle>);

impl Countdown {
    pub fn new(handle: AbortHandle) -> Self {
        Self(Arc::new(handle))
    }

    pub fn cancel(&self) {
        self.0.abort();
    }
}

/// Orders the log lines of one timer: whoever holds the gate appends first.
///
/// Confirm holds it from before the timer becomes visible as running until
/// the start line is written; every stop takes it before writing its line.
#[derive(Debug, Clone, Default)]
pub struct LogGate(Arc<Mutex<()>>);

impl LogGate {
    pub fn hold(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for LogGate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for LogGate {}

#[derive(Debug, Clone)]
pub enum Phase {
    /// Created by "begin setup", waiting for a name.
    Naming,

    /// Named, waiting for a duration in minutes.
    Sizing { name: String },

    /// Fully configured, waiting for confirmation.
    Armed { name: String, duration: Duration },

    /// Counting down. `countdown` is attached right after the task is spawned.
    Running {
        name: String,
        duration: Duration,
        started_at: DateTime<Local>,
        countdown: Option<Countdown>,
        log_gate: LogGate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Manual,
    Expired,
}

/// What is left of a timer once it has been removed from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedTimer {
    pub id: TimerId,
    pub name: String,
    pub duration: Duration,
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
    pub reason: StopReason,
    pub log_gate: LogGate,
}

/// Returned by a successful confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    pub id: TimerId,
    pub name: String,
    pub duration: Duration,
    pub started_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct Timer {
    id: TimerId,
    phase: Phase,
}

impl Timer {
    pub fn new(id: TimerId) -> Self {
        Self {
            id,
            phase: Phase::Naming,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_name(&self) -> &'static str {
        match self.phase {
            Phase::Naming => "naming",
            Phase::Sizing { .. } => "sizing",
            Phase::Armed { .. } => "armed",
            Phase::Running { .. } => "running",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.phase {
            Phase::Naming => None,
            Phase::Sizing { name }
            | Phase::Armed { name, .. }
            | Phase::Running { name, .. } => Some(name),
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Armed { duration, .. } | Phase::Running { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        match &self.phase {
            Phase::Running { started_at, .. } => Some(*started_at),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_running_instance(&self, id: TimerId) -> bool {
        self.id == id && self.is_running()
    }

    /// NAMING -> SIZING. The text is taken verbatim.
    pub fn set_name(&mut self, text: &str) -> Result<(), TransitionError> {
        match self.phase {
            Phase::Naming => {
                if text.trim().is_empty() {
                    return Err(TransitionError::EmptyName);
                }
                self.phase = Phase::Sizing {
                    name: text.to_string(),
                };
                Ok(())
            }
            _ => Err(TransitionError::OutOfProtocol),
        }
    }

    /// SIZING -> ARMED.
    pub fn set_duration(&mut self, duration: Duration) -> Result<(), TransitionError> {
        match &mut self.phase {
            Phase::Sizing { name } => {
                if duration.is_zero() {
                    return Err(TransitionError::InvalidDuration);
                }
                let name = std::mem::take(name);
                self.phase = Phase::Armed { name, duration };
                Ok(())
            }
            _ => Err(TransitionError::OutOfProtocol),
        }
    }

    /// ARMED -> RUNNING. Anything else is left untouched. `log_gate` is kept
    /// with the running timer and handed to its stop.
    pub fn start(
        &mut self,
        now: DateTime<Local>,
        log_gate: &LogGate,
    ) -> Result<Started, TransitionError> {
        match &mut self.phase {
            Phase::Armed { name, duration } => {
                let name = std::mem::take(name);
                let duration = *duration;
                self.phase = Phase::Running {
                    name: name.clone(),
                    duration,
                    started_at: now,
                    countdown: None,
                    log_gate: log_gate.clone(),
                };
                Ok(Started {
                    id: self.id,
                    name,
                    duration,
                    started_at: now,
                })
            }
            Phase::Running { .. } => Err(TransitionError::AlreadyRunning),
            _ => Err(TransitionError::NotConfigured),
        }
    }

    /// Stores the countdown handle. Returns false if this is no longer the
    /// running instance `id`, in which case the caller owns the handle.
    pub fn attach_countdown(&mut self, id: TimerId, handle: Countdown) -> bool {
        if self.id != id {
            return false;
        }
        match &mut self.phase {
            Phase::Running { countdown, .. } => {
                *countdown = Some(handle);
                true
            }
            _ => false,
        }
    }

    /// Consumes a timer that has already been removed from the store.
    ///
    /// Returns `None` for a timer that never started; a manual stop also
    /// cancels the pending countdown.
    pub fn finish(self, now: DateTime<Local>, reason: StopReason) -> Option<StoppedTimer> {
        match self.phase {
            Phase::Running {
                name,
                duration,
                started_at,
                countdown,
                log_gate,
            } => {
                if reason == StopReason::Manual {
                    if let Some(c) = countdown {
                        c.cancel();
                    }
                }
                Some(StoppedTimer {
                    id: self.id,
                    name,
                    duration,
                    started_at,
                    stopped_at: now,
                    reason,
                    log_gate,
                })
            }
            _ => None,
        }
    }
}
