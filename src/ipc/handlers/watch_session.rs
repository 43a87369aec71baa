// Author: Dustin Pilgrim
// License: MIT

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;

use super::IpcContext;
use crate::core::session::SessionId;
use crate::{sdebug, swarn};

/// Handle `chatimer watch <session>`: stream every effect for the session
/// until the client goes away or the daemon shuts down.
pub async fn handle_watch<W>(ctx: &IpcContext, session: SessionId, out: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut rx = ctx.presenter.subscribe();
    let mut shutdown = ctx.shutdown.subscribe();

    out.write_all(format!("watching session {}\n", session).as_bytes()).await?;
    out.flush().await?;

    loop {
        tokio::select! {
            biased;

            res = rx.recv() => match res {
                Ok(ev) if ev.session() == session => {
                    out.write_all(format!("{}\n\n", ev).as_bytes()).await?;
                    out.flush().await?;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    swarn!("IPC", "watcher for session {} skipped {} effects", session, n);
                }
                Err(RecvError::Closed) => break,
            },

            // Release the watch read guard inside the branch; the future has to stay Send.
            _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => {
                sdebug!("IPC", "watcher for session {} closed by shutdown", session);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use tokio::sync::watch;

    use crate::core::event_log::FileEventLog;
    use crate::core::inbound::Inbound;
    use crate::core::machine::TimerMachine;
    use crate::core::presenter::BroadcastPresenter;
    use crate::core::store::MemoryStore;

    #[tokio::test]
    async fn streams_only_the_watched_session() {
        let dir = tempfile::tempdir().unwrap();
        let presenter = Arc::new(BroadcastPresenter::new(16));
        let machine = TimerMachine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FileEventLog::new(dir.path().join("timers.log"))),
            presenter.clone(),
        );
        let (shutdown, _) = watch::channel(false);
        let ctx = IpcContext {
            machine,
            presenter,
            shutdown,
        };

        let (mut client, mut server) = tokio::io::duplex(4096);
        let watcher = {
            let ctx = ctx.clone();
            tokio::spawn(async move { handle_watch(&ctx, SessionId::new(1), &mut server).await })
        };

        // Wait for the greeting so the subscription is in place.
        let mut greeting = [0u8; 19];
        client.read_exact(&mut greeting).await.unwrap();
        assert_eq!(&greeting, b"watching session 1\n");

        ctx.machine.handle(Inbound::BeginSetup(SessionId::new(2)));
        ctx.machine.handle(Inbound::BeginSetup(SessionId::new(1)));
        ctx.shutdown.send_replace(true);
        watcher.await.unwrap().unwrap();

        let mut rest = String::new();
        client.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "Введите название таймера:\n\n");
    }
}
