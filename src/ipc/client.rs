// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use tokio::{
    io::{AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::UnixStream,
    time::{timeout, Duration},
};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(2);

async fn connect(socket: &Path, cmd: &str) -> Result<UnixStream, String> {
    if !socket.exists() {
        return Err("daemon not running".to_string());
    }

    let mut stream = match timeout(CLIENT_TIMEOUT, UnixStream::connect(socket)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(format!("failed to connect to {}: {e}", socket.display())),
        Err(_) => return Err("timeout connecting to daemon".to_string()),
    };

    timeout(CLIENT_TIMEOUT, stream.write_all(cmd.as_bytes()))
        .await
        .map_err(|_| "timeout writing to daemon".to_string())?
        .map_err(|e| format!("write failed: {e}"))?;

    timeout(CLIENT_TIMEOUT, stream.shutdown())
        .await
        .map_err(|_| "timeout finalizing request".to_string())?
        .map_err(|e| format!("shutdown failed: {e}"))?;

    Ok(stream)
}

/// Sends one request and returns the whole reply.
pub async fn send_raw(socket: &Path, cmd: &str) -> Result<String, String> {
    let mut stream = connect(socket, cmd).await?;

    let mut resp = Vec::new();
    timeout(CLIENT_TIMEOUT, stream.read_to_end(&mut resp))
        .await
        .map_err(|_| "timeout reading response".to_string())?
        .map_err(|e| format!("read failed: {e}"))?;

    Ok(String::from_utf8_lossy(&resp).to_string())
}

/// Sends a streaming request and copies the reply to `out` until the daemon
/// closes the connection. No read timeout.
pub async fn stream_raw<W>(socket: &Path, cmd: &str, out: &mut W) -> Result<(), String>
where
    W: AsyncWrite + Unpin,
{
    let mut stream = connect(socket, cmd).await?;

    let mut buf = [0u8; 4096];
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| format!("read failed: {e}"))?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])
            .await
            .map_err(|e| format!("write failed: {e}"))?;
        out.flush().await.map_err(|e| format!("write failed: {e}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_socket_means_no_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let err = send_raw(&dir.path().join("gone.sock"), "status 1").await.unwrap_err();
        assert_eq!(err, "daemon not running");
    }
}
