// Author: Dustin Pilgrim
// License: MIT

use crate::core::inbound::Inbound;
use crate::core::session::SessionId;
use crate::swarn;

use super::handlers::{self, IpcContext};

/// One parsed IPC request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Event(Inbound),
    Status { session: SessionId, json: bool },
    Watch(SessionId),
    Shutdown,
}

/// Parses `<verb> [<session> [<args>]]`. Errors are ready-to-send replies.
pub fn parse_request(line: &str) -> Result<Request, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (verb, rest) = split_word(line);

    match verb {
        "" => Err("ERROR: empty command".to_string()),
        "shutdown" => Ok(Request::Shutdown),
        "menu" | "setup" | "text" | "press" | "confirm" | "stop" | "logs" | "status"
        | "watch" => {
            let (raw_session, args) = split_word(rest);
            let session: SessionId = raw_session
                .parse()
                .map_err(|_| format!("ERROR: invalid session id '{}'", raw_session))?;
            parse_session_request(verb, session, args)
        }
        other => Err(format!("ERROR: Unknown command '{}'", other)),
    }
}

fn parse_session_request(verb: &str, session: SessionId, args: &str) -> Result<Request, String> {
    let req = match verb {
        "menu" => Request::Event(Inbound::Menu(session)),
        "setup" => Request::Event(Inbound::BeginSetup(session)),
        "confirm" => Request::Event(Inbound::Confirm(session)),
        "stop" => Request::Event(Inbound::Stop(session)),
        "logs" => Request::Event(Inbound::ShowLogs(session)),
        "watch" => Request::Watch(session),
        "status" => Request::Status {
            session,
            json: args.split_whitespace().any(|a| a == "--json"),
        },
        "text" => {
            if args.is_empty() {
                return Err("ERROR: text needs a message".to_string());
            }
            Request::Event(Inbound::from_text(session, args))
        }
        "press" => {
            let data = args.trim();
            let Some(ev) = Inbound::from_choice(session, data) else {
                swarn!("IPC", "session {}: ignoring unknown choice '{}'", session, data);
                return Err(format!("ERROR: unknown choice '{}'", data));
            };
            Request::Event(ev)
        }
        other => return Err(format!("ERROR: Unknown command '{}'", other)),
    };
    Ok(req)
}

/// Splits off the first whitespace-delimited word. The remainder keeps its
/// inner spacing so free text arrives verbatim.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => {
            let ws_len = s[i..].chars().next().map_or(1, char::len_utf8);
            (&s[..i], &s[i + ws_len..])
        }
        None => (s, ""),
    }
}

/// Handles every request except `watch`, which keeps the connection open
/// and is served by the server loop directly.
pub fn route_request(req: Request, ctx: &IpcContext) -> String {
    match req {
        Request::Event(ev) => handlers::event::handle_event(ctx, ev),
        Request::Status { session, json } => handlers::status::handle_status(ctx, session, json),
        Request::Shutdown => handlers::shutdown::handle_shutdown(ctx),
        Request::Watch(session) => format!("ERROR: watch {} needs a streaming connection", session),
    }
}
