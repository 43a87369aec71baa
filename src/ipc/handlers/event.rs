// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::broadcast::error::TryRecvError;

use super::IpcContext;
use crate::core::inbound::Inbound;
use crate::swarn;

/// Runs one inbound event and replies with every effect it produced for
/// that session, in delivery order.
///
/// Effects are matched by session only. An expiry firing while the event
/// runs, or a parallel request on the same session, shows up in this reply
/// too; `watch` is the complete feed.
pub fn handle_event(ctx: &IpcContext, event: Inbound) -> String {
    let session = event.session();

    // Subscribe first: delivery happens synchronously inside `handle`.
    let mut rx = ctx.presenter.subscribe();
    ctx.machine.handle(event);

    let mut blocks = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(out) if out.session() == session => blocks.push(out.to_string()),
            Ok(_) => {}
            Err(TryRecvError::Lagged(n)) => {
                swarn!("IPC", "reply for session {} skipped {} effects", session, n);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    blocks.join("\n\n")
}
