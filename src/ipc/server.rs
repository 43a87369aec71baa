// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use eyre::{Result, WrapErr};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    task::JoinHandle,
    time::{Duration, timeout},
};

use super::handlers::{IpcContext, watch_session};
use super::router::{Request, parse_request, route_request};
use crate::{sdebug, serror, sinfo};

/// Requests are one short line; anything longer is cut off.
const MAX_REQUEST_BYTES: u64 = 8 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Binds the socket (replacing a stale one) and spawns the accept loop.
pub async fn spawn_ipc_server(ctx: IpcContext, socket: &Path) -> Result<JoinHandle<()>> {
    if let Some(parent) = socket.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }

    // The single-instance lock is already held, so any socket file left
    // here belongs to a dead daemon.
    if socket.exists() {
        let _ = std::fs::remove_file(socket);
    }

    let listener = UnixListener::bind(socket)
        .wrap_err_with(|| format!("failed to bind IPC socket {}", socket.display()))?;

    sinfo!("IPC", "listening on {}", socket.display());

    Ok(tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, ctx).await;
                    });
                }
                Err(e) => serror!("IPC", "Failed to accept IPC connection: {}", e),
            }
        }
    }))
}

/// One request per connection. Every request except `watch` is bounded by
/// [`REQUEST_TIMEOUT`].
async fn handle_connection(mut stream: UnixStream, ctx: IpcContext) {
    let request = match timeout(REQUEST_TIMEOUT, read_request(&mut stream)).await {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => {
            serror!("IPC", "Error reading IPC request: {}", e);
            return;
        }
        Err(_) => {
            serror!("IPC", "IPC request timed out after {}s", REQUEST_TIMEOUT.as_secs());
            return;
        }
    };

    if request.trim().is_empty() {
        return;
    }

    sdebug!("IPC", "Received IPC command: {}", request.trim_end());

    let result = match parse_request(&request) {
        Ok(Request::Watch(session)) => {
            watch_session::handle_watch(&ctx, session, &mut stream).await
        }
        Ok(req) => {
            let reply = route_request(req, &ctx);
            match timeout(REQUEST_TIMEOUT, write_reply(&mut stream, &reply)).await {
                Ok(res) => res,
                Err(_) => {
                    serror!("IPC", "IPC reply timed out after {}s", REQUEST_TIMEOUT.as_secs());
                    Ok(())
                }
            }
        }
        Err(reply) => write_reply(&mut stream, &reply).await,
    };

    if let Err(e) = result {
        sdebug!("IPC", "connection closed early: {}", e);
    }

    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut UnixStream) -> std::io::Result<String> {
    let mut buf = Vec::new();
    (&mut *stream).take(MAX_REQUEST_BYTES).read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn write_reply(stream: &mut UnixStream, reply: &str) -> std::io::Result<()> {
    stream.write_all(reply.as_bytes()).await?;
    if !reply.ends_with('\n') {
        stream.write_all(b"\n").await?;
    }
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::watch;

    use crate::core::event_log::FileEventLog;
    use crate::core::machine::TimerMachine;
    use crate::core::presenter::BroadcastPresenter;
    use crate::core::store::MemoryStore;
    use crate::ipc::client::{send_raw, stream_raw};

    fn context(dir: &Path) -> IpcContext {
        let presenter = Arc::new(BroadcastPresenter::new(64));
        let machine = TimerMachine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FileEventLog::new(dir.join("timers.log"))),
            presenter.clone(),
        );
        let (shutdown, _) = watch::channel(false);
        IpcContext {
            machine,
            presenter,
            shutdown,
        }
    }

    #[tokio::test]
    async fn dialog_over_the_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("run").join("chatimer.sock");
        let ctx = context(dir.path());
        let server = spawn_ipc_server(ctx.clone(), &socket).await.unwrap();

        let reply = send_raw(&socket, "setup 7").await.unwrap();
        assert_eq!(reply.trim_end(), "Введите название таймера:");

        let reply = send_raw(&socket, "text 7 Brew").await.unwrap();
        assert_eq!(reply.trim_end(), "Введите время в минутах:");

        let reply = send_raw(&socket, "text 7 2").await.unwrap();
        assert!(reply.contains("[confirm_timer] Запустить"));

        let reply = send_raw(&socket, "press 7 confirm_timer").await.unwrap();
        assert!(reply.starts_with("Таймер \"Brew\" запущен на 2 минут."));

        let reply = send_raw(&socket, "status 7").await.unwrap();
        assert!(reply.contains("Phase: running"));

        let reply = send_raw(&socket, "stop 7").await.unwrap();
        assert_eq!(reply.trim_end(), "Таймер \"Brew\" остановлен.");

        let log = std::fs::read_to_string(dir.path().join("timers.log")).unwrap();
        assert_eq!(log.lines().count(), 2);

        server.abort();
    }

    #[tokio::test]
    async fn unknown_commands_get_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("chatimer.sock");
        let server = spawn_ipc_server(context(dir.path()), &socket).await.unwrap();

        let reply = send_raw(&socket, "dance 1").await.unwrap();
        assert_eq!(reply.trim_end(), "ERROR: Unknown command 'dance'");

        server.abort();
    }

    #[tokio::test]
    async fn watch_streams_until_shutdown() {
        use tokio::io::AsyncReadExt;

        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("chatimer.sock");
        let server = spawn_ipc_server(context(dir.path()), &socket).await.unwrap();

        let (mut reader, mut writer) = tokio::io::duplex(4096);
        let watcher = {
            let socket = socket.clone();
            tokio::spawn(async move { stream_raw(&socket, "watch 3", &mut writer).await })
        };

        // The greeting is written once the watcher is subscribed.
        let mut greeting = [0u8; 19];
        reader.read_exact(&mut greeting).await.unwrap();
        assert_eq!(&greeting, b"watching session 3\n");

        send_raw(&socket, "setup 3").await.unwrap();
        send_raw(&socket, "setup 4").await.unwrap();
        send_raw(&socket, "shutdown").await.unwrap();
        watcher.await.unwrap().unwrap();

        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "Введите название таймера:\n\n");

        server.abort();
    }

    #[tokio::test]
    async fn shutdown_flips_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("chatimer.sock");
        let ctx = context(dir.path());
        let mut rx = ctx.shutdown.subscribe();
        let server = spawn_ipc_server(ctx, &socket).await.unwrap();

        let reply = send_raw(&socket, "shutdown").await.unwrap();
        assert_eq!(reply.trim_end(), "Stopping chatimer daemon");
        rx.wait_for(|stop| *stop).await.unwrap();

        server.abort();
    }
}
