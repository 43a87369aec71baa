// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;

use crate::core::error::TransitionError;
use crate::core::event_log::{EventLog, LogRecord};
use crate::core::inbound::Inbound;
use crate::core::messages;
use crate::core::presenter::{Choice, Presenter};
use crate::core::router::{self, InputOutcome};
use crate::core::session::SessionId;
use crate::core::store::SessionStore;
use crate::core::timer::{Countdown, LogGate, Started, StopReason, StoppedTimer, Timer, TimerId};
use crate::{sdebug, sinfo};

/// Per-session timer lifecycle: naming, sizing, armed, running, stopped.
///
/// Cheap to clone; every clone drives the same store. Each transition goes
/// through exactly one atomic store operation, so transitions on different
/// sessions only contend for that critical section.
#[derive(Clone)]
pub struct TimerMachine {
    store: Arc<dyn SessionStore>,
    log: Arc<dyn EventLog>,
    presenter: Arc<dyn Presenter>,
    next_id: Arc<AtomicU64>,
}

impl TimerMachine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        log: Arc<dyn EventLog>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            store,
            log,
            presenter,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Entry point for one inbound event. Rejected transitions are turned
    /// into guidance for the session.
    pub fn handle(&self, event: Inbound) {
        let session = event.session();

        let res = match event {
            Inbound::Menu(_) => {
                self.menu(session);
                Ok(())
            }
            Inbound::BeginSetup(_) => {
                self.begin_setup(session);
                Ok(())
            }
            Inbound::TextInput(_, text) => self.text_input(session, &text).map(|_| ()),
            Inbound::Confirm(_) => self.confirm(session).map(|_| ()),
            Inbound::Stop(_) => self.stop(session).map(|_| ()),
            Inbound::ShowLogs(_) => {
                self.show_logs(session);
                Ok(())
            }
        };

        if let Err(e) = res {
            sdebug!("Timer", "session {}: rejected: {}", session, e);
            self.presenter
                .notice(session, messages::rejected(e).to_string());
        }
    }

    pub fn menu(&self, session: SessionId) {
        self.presenter.prompt(
            session,
            messages::MENU.to_string(),
            vec![Choice::StartTimer, Choice::ShowLogs],
        );
    }

    pub fn show_logs(&self, session: SessionId) {
        let text = match self.log.read_all() {
            Some(body) => messages::logs(&body),
            None => messages::LOGS_EMPTY.to_string(),
        };
        self.presenter.notice(session, text);
    }

    /// Current timer of the session, if any.
    pub fn status(&self, session: SessionId) -> Option<Timer> {
        self.store.get(session)
    }

    /// ABSENT -> NAMING. Replaces whatever the session had; a replaced
    /// running timer is stopped and logged first.
    pub fn begin_setup(&self, session: SessionId) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        if let Some(prev) = self.store.put(session, Timer::new(id)) {
            sdebug!(
                "Timer",
                "session {}: setup replaces timer {:?} ({})",
                session,
                prev.id(),
                prev.phase_name()
            );
            if let Some(stopped) = prev.finish(Local::now(), StopReason::Manual) {
                self.record_stop(session, &stopped);
            }
        }

        self.presenter
            .prompt(session, messages::ASK_NAME.to_string(), Vec::new());
        id
    }

    /// NAMING -> SIZING or SIZING -> ARMED, depending on the phase.
    pub fn text_input(
        &self,
        session: SessionId,
        text: &str,
    ) -> Result<InputOutcome, TransitionError> {
        let outcome = self
            .store
            .update(session, |timer| router::route(timer, text))
            .ok_or(TransitionError::OutOfProtocol)??;

        match &outcome {
            InputOutcome::Named { name } => {
                sdebug!("Timer", "session {}: named \"{}\"", session, name);
                self.presenter
                    .prompt(session, messages::ASK_MINUTES.to_string(), Vec::new());
            }
            InputOutcome::Armed { name, duration } => {
                sdebug!("Timer", "session {}: armed \"{}\" for {:?}", session, name, duration);
                self.presenter.prompt(
                    session,
                    messages::confirm(name, *duration),
                    vec![Choice::ConfirmTimer],
                );
            }
        }

        Ok(outcome)
    }

    /// ARMED -> RUNNING, then schedules the auto-expiry.
    pub fn confirm(&self, session: SessionId) -> Result<Started, TransitionError> {
        let now = Local::now();

        // Held until the start line is written, so a stop racing in right
        // after the store update waits for it instead of logging first.
        let log_gate = LogGate::default();
        let held = log_gate.hold();

        let started = self
            .store
            .update(session, |timer| timer.start(now, &log_gate))
            .ok_or(TransitionError::NotConfigured)??;

        self.log.append(&LogRecord::start(&started));
        drop(held);

        sinfo!(
            "Timer",
            "session {}: started \"{}\" for {} min",
            session,
            started.name,
            started.duration.as_secs() / 60
        );

        self.presenter.prompt(
            session,
            messages::started(&started.name, started.duration),
            vec![Choice::StopTimer],
        );

        self.schedule_expiry(session, &started);
        Ok(started)
    }

    /// RUNNING -> STOPPED on user request. A timer still being configured
    /// is discarded without a log entry.
    pub fn stop(&self, session: SessionId) -> Result<Option<StoppedTimer>, TransitionError> {
        let timer = self
            .store
            .remove(session)
            .ok_or(TransitionError::NothingToStop)?;

        match timer.finish(Local::now(), StopReason::Manual) {
            Some(stopped) => {
                self.record_stop(session, &stopped);
                Ok(Some(stopped))
            }
            None => {
                sdebug!("Timer", "session {}: setup cancelled", session);
                self.presenter
                    .notice(session, messages::SETUP_CANCELLED.to_string());
                Ok(None)
            }
        }
    }

    fn schedule_expiry(&self, session: SessionId, started: &Started) {
        let id = started.id;
        let duration = started.duration;
        let machine = self.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            machine.expire(session, id);
        });

        let countdown = Countdown::new(task.abort_handle());
        let attached = self
            .store
            .update(session, |timer| timer.attach_countdown(id, countdown.clone()))
            .unwrap_or(false);

        if !attached {
            // Stopped or replaced before the handle could be stored.
            countdown.cancel();
        }
    }

    /// RUNNING -> STOPPED when the countdown fires. Only the instance that
    /// scheduled the countdown is removed; anything else is a no-op.
    pub(crate) fn expire(&self, session: SessionId, id: TimerId) -> Option<StoppedTimer> {
        let Some(timer) = self
            .store
            .remove_if(session, &|t: &Timer| t.is_running_instance(id))
        else {
            sdebug!(
                "Timer",
                "session {}: countdown for {:?} fired after stop, ignoring",
                session,
                id
            );
            return None;
        };

        let stopped = timer.finish(Local::now(), StopReason::Expired)?;
        self.record_stop(session, &stopped);
        Some(stopped)
    }

    fn record_stop(&self, session: SessionId, stopped: &StoppedTimer) {
        {
            let _held = stopped.log_gate.hold();
            self.log.append(&LogRecord::stop(stopped));
        }

        let expired = stopped.reason == StopReason::Expired;
        sinfo!(
            "Timer",
            "session {}: stopped \"{}\"{}",
            session,
            stopped.name,
            if expired { " (expired)" } else { "" }
        );

        self.presenter
            .notice(session, messages::stopped(&stopped.name, expired));
    }
}
