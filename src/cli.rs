// Author: Dustin Pilgrim
// License: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::session::SessionId;

#[derive(Parser, Debug)]
#[command(
    name = "chatimer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Per-chat timer daemon"
)]
pub struct Args {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Show the main menu (same as /start)")]
    Menu {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,
    },

    #[command(about = "Begin setting up a new timer")]
    Setup {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,
    },

    #[command(about = "Send free text (timer name, minutes, or a /command)")]
    Text {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        text: Vec<String>,
    },

    #[command(about = "Press a button by its callback data")]
    Press {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,

        data: String,
    },

    #[command(about = "Start the armed timer")]
    Confirm {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,
    },

    #[command(about = "Stop the running timer")]
    Stop {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,
    },

    #[command(about = "Show the start/stop log")]
    Logs {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,
    },

    #[command(about = "Display the session's timer")]
    Status {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Follow everything shown to a session")]
    Watch {
        #[arg(allow_negative_numbers = true)]
        session: SessionId,
    },

    #[command(about = "Stop the running chatimer daemon")]
    Shutdown,
}

impl Command {
    /// The IPC request line for this command.
    pub fn request_line(&self) -> String {
        match self {
            Command::Menu { session } => format!("menu {}", session),
            Command::Setup { session } => format!("setup {}", session),
            Command::Text { session, text } => format!("text {} {}", session, text.join(" ")),
            Command::Press { session, data } => format!("press {} {}", session, data),
            Command::Confirm { session } => format!("confirm {}", session),
            Command::Stop { session } => format!("stop {}", session),
            Command::Logs { session } => format!("logs {}", session),
            Command::Status { session, json } => {
                if *json {
                    format!("status {} --json", session)
                } else {
                    format!("status {}", session)
                }
            }
            Command::Watch { session } => format!("watch {}", session),
            Command::Shutdown => "shutdown".to_string(),
        }
    }
}
