// Author: Dustin Pilgrim
// License: MIT

use crate::core::presenter::Choice;
use crate::core::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Menu(SessionId),
    BeginSetup(SessionId),
    TextInput(SessionId, String),
    Confirm(SessionId),
    Stop(SessionId),
    ShowLogs(SessionId),
}

impl Inbound {
    /// A chat message: `/start` and `/logs` are commands, anything else is
    /// dialog input.
    pub fn from_text(session: SessionId, text: &str) -> Self {
        match text.trim() {
            "/start" => Inbound::Menu(session),
            "/logs" => Inbound::ShowLogs(session),
            _ => Inbound::TextInput(session, text.to_string()),
        }
    }

    /// A pressed button, by its callback data.
    pub fn from_choice(session: SessionId, data: &str) -> Option<Self> {
        let ev = match Choice::from_data(data)? {
            Choice::StartTimer => Inbound::BeginSetup(session),
            Choice::ShowLogs => Inbound::ShowLogs(session),
            Choice::ConfirmTimer => Inbound::Confirm(session),
            Choice::StopTimer => Inbound::Stop(session),
        };
        Some(ev)
    }

    pub fn session(&self) -> SessionId {
        match self {
            Inbound::Menu(s)
            | Inbound::BeginSetup(s)
            | Inbound::TextInput(s, _)
            | Inbound::Confirm(s)
            | Inbound::Stop(s)
            | Inbound::ShowLogs(s) => *s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: SessionId = SessionId::new(9);

    #[test]
    fn slash_commands_are_not_dialog_input() {
        assert_eq!(Inbound::from_text(S, "/start"), Inbound::Menu(S));
        assert_eq!(Inbound::from_text(S, "/logs"), Inbound::ShowLogs(S));
        assert_eq!(
            Inbound::from_text(S, "Brew"),
            Inbound::TextInput(S, "Brew".to_string())
        );
    }

    #[test]
    fn buttons_map_to_transitions() {
        assert_eq!(Inbound::from_choice(S, "start_timer"), Some(Inbound::BeginSetup(S)));
        assert_eq!(Inbound::from_choice(S, "confirm_timer"), Some(Inbound::Confirm(S)));
        assert_eq!(Inbound::from_choice(S, "stop_timer"), Some(Inbound::Stop(S)));
        assert_eq!(Inbound::from_choice(S, "show_logs"), Some(Inbound::ShowLogs(S)));
        assert_eq!(Inbound::from_choice(S, "reboot"), None);
    }
}
