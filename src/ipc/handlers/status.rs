// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

use chrono::{DateTime, Local};
use serde_json::json;

use super::IpcContext;
use crate::core::session::SessionId;
use crate::core::timer::Timer;

/// Handle `chatimer status <session> [--json]`.
pub fn handle_status(ctx: &IpcContext, session: SessionId, as_json: bool) -> String {
    let timer = ctx.machine.status(session);
    let now = Local::now();

    if as_json {
        render_json(session, timer.as_ref(), now)
    } else {
        render_text(timer.as_ref(), now)
    }
}

fn remaining(timer: &Timer, now: DateTime<Local>) -> Option<Duration> {
    let started = timer.started_at()?;
    let total = timer.duration()?;
    let elapsed = (now - started).to_std().unwrap_or_default();
    Some(total.saturating_sub(elapsed))
}

fn render_text(timer: Option<&Timer>, now: DateTime<Local>) -> String {
    let Some(t) = timer else {
        return "No timer".to_string();
    };

    let mut out = format!("Phase: {}", t.phase_name());
    if let Some(name) = t.name() {
        out.push_str(&format!("\nName: {}", name));
    }
    if let Some(d) = t.duration() {
        out.push_str(&format!("\nDuration: {} min", d.as_secs() / 60));
    }
    if let Some(at) = t.started_at() {
        out.push_str(&format!("\nStarted: {}", at.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(left) = remaining(t, now) {
        out.push_str(&format!("\nRemaining: {}s", left.as_secs()));
    }
    out
}

fn render_json(session: SessionId, timer: Option<&Timer>, now: DateTime<Local>) -> String {
    let value = match timer {
        None => json!({
            "session": session.get(),
            "phase": "absent",
        }),
        Some(t) => json!({
            "session": session.get(),
            "phase": t.phase_name(),
            "name": t.name(),
            "duration_secs": t.duration().map(|d| d.as_secs()),
            "started_at": t.started_at().map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
            "remaining_secs": remaining(t, now).map(|d| d.as_secs()),
        }),
    };
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::{LogGate, TimerId};

    fn running(minutes: u64, started: DateTime<Local>) -> Timer {
        let mut t = Timer::new(TimerId(1));
        t.set_name("Brew").unwrap();
        t.set_duration(Duration::from_secs(minutes * 60)).unwrap();
        t.start(started, &LogGate::default()).unwrap();
        t
    }

    #[test]
    fn absent_timer() {
        assert_eq!(render_text(None, Local::now()), "No timer");

        let v: serde_json::Value =
            serde_json::from_str(&render_json(SessionId::new(3), None, Local::now())).unwrap();
        assert_eq!(v["phase"], "absent");
        assert_eq!(v["session"], 3);
    }

    #[test]
    fn running_timer_reports_time_left() {
        let started = Local::now();
        let t = running(10, started);
        let now = started + chrono::Duration::seconds(90);

        let text = render_text(Some(&t), now);
        assert!(text.contains("Phase: running"));
        assert!(text.contains("Remaining: 510s"));

        let v: serde_json::Value =
            serde_json::from_str(&render_json(SessionId::new(3), Some(&t), now)).unwrap();
        assert_eq!(v["name"], "Brew");
        assert_eq!(v["duration_secs"], 600);
        assert_eq!(v["remaining_secs"], 510);
    }

    #[test]
    fn overdue_timer_has_nothing_left() {
        let started = Local::now();
        let t = running(1, started);
        let now = started + chrono::Duration::seconds(120);
        assert_eq!(remaining(&t, now), Some(Duration::ZERO));
    }

    #[test]
    fn draft_has_no_remaining_time() {
        let mut t = Timer::new(TimerId(2));
        t.set_name("draft").unwrap();
        let text = render_text(Some(&t), Local::now());
        assert_eq!(text, "Phase: sizing\nName: draft");
    }
}
