// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use tokio::sync::broadcast;

use crate::core::session::SessionId;

/// A button offered alongside a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    StartTimer,
    ShowLogs,
    ConfirmTimer,
    StopTimer,
}

impl Choice {
    pub const ALL: [Choice; 4] = [
        Choice::StartTimer,
        Choice::ShowLogs,
        Choice::ConfirmTimer,
        Choice::StopTimer,
    ];

    /// Callback payload sent back when the button is pressed.
    pub fn data(self) -> &'static str {
        match self {
            Choice::StartTimer => "start_timer",
            Choice::ShowLogs => "show_logs",
            Choice::ConfirmTimer => "confirm_timer",
            Choice::StopTimer => "stop_timer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Choice::StartTimer => "Старт таймера",
            Choice::ShowLogs => "Показать логи",
            Choice::ConfirmTimer => "Запустить",
            Choice::StopTimer => "Остановить таймер",
        }
    }

    pub fn from_data(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.data() == data.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Prompt {
        session: SessionId,
        text: String,
        choices: Vec<Choice>,
    },
    Notice {
        session: SessionId,
        text: String,
    },
}

impl Outbound {
    pub fn session(&self) -> SessionId {
        match self {
            Outbound::Prompt { session, .. } | Outbound::Notice { session, .. } => *session,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Outbound::Prompt { text, .. } | Outbound::Notice { text, .. } => text,
        }
    }
}

impl fmt::Display for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())?;
        if let Outbound::Prompt { choices, .. } = self {
            for c in choices {
                write!(f, "\n  [{}] {}", c.data(), c.label())?;
            }
        }
        Ok(())
    }
}

/// Whatever shows prompts and notices to the user.
pub trait Presenter: Send + Sync {
    fn deliver(&self, out: Outbound);

    fn prompt(&self, session: SessionId, text: String, choices: Vec<Choice>) {
        self.deliver(Outbound::Prompt {
            session,
            text,
            choices,
        });
    }

    fn notice(&self, session: SessionId, text: String) {
        self.deliver(Outbound::Notice { session, text });
    }
}

/// Fans every effect out to all current subscribers. Effects sent while
/// nobody is subscribed are dropped.
pub struct BroadcastPresenter {
    tx: broadcast::Sender<Outbound>,
}

impl BroadcastPresenter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.tx.subscribe()
    }
}

impl Presenter for BroadcastPresenter {
    fn deliver(&self, out: Outbound) {
        let _ = self.tx.send(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_data_round_trips() {
        for c in Choice::ALL {
            assert_eq!(Choice::from_data(c.data()), Some(c));
        }
        assert_eq!(Choice::from_data("nope"), None);
    }

    #[test]
    fn prompt_renders_its_choices() {
        let out = Outbound::Prompt {
            session: SessionId::new(1),
            text: "Выберите действие:".to_string(),
            choices: vec![Choice::StartTimer, Choice::ShowLogs],
        };
        assert_eq!(
            out.to_string(),
            "Выберите действие:\n  [start_timer] Старт таймера\n  [show_logs] Показать логи"
        );
    }

    #[test]
    fn broadcast_reaches_subscribers() {
        let presenter = BroadcastPresenter::new(8);
        let mut rx = presenter.subscribe();

        presenter.notice(SessionId::new(5), "hi".to_string());

        let got = rx.try_recv().unwrap();
        assert_eq!(got.session(), SessionId::new(5));
        assert_eq!(got.text(), "hi");
    }
}
