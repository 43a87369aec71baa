// Author: Dustin Pilgrim
// License: MIT

use eyre::{Result, eyre};

use crate::cli::{Args, Command};
use crate::ipc::client;

/// Printed by `status --json` when the daemon is down so scripts always get JSON.
const NOT_RUNNING_JSON: &str = r#"{"phase":"not_running"}"#;

pub async fn run(args: Args) -> Result<()> {
    let cmd = args
        .command
        .as_ref()
        .ok_or_else(|| eyre!("no command given"))?;

    // Only the socket location matters to the client; a broken config file
    // should not stop `shutdown` from reaching the daemon.
    let socket = match crate::config::load(args.config.as_deref()) {
        Ok(loaded) => loaded.cfg.socket,
        Err(e) => {
            eprintln!("chatimer: {e:#}");
            crate::ipc::default_socket_path()
        }
    };

    let line = cmd.request_line();

    if let Command::Watch { .. } = cmd {
        let mut stdout = tokio::io::stdout();
        if let Err(e) = client::stream_raw(&socket, &line, &mut stdout).await {
            eprintln!("chatimer: {e}");
        }
        return Ok(());
    }

    match client::send_raw(&socket, &line).await {
        Ok(resp) => {
            let out = resp.trim_end();
            if !out.is_empty() {
                println!("{out}");
            }
        }
        Err(e) => match cmd {
            Command::Status { json: true, .. } => println!("{NOT_RUNNING_JSON}"),
            _ => eprintln!("chatimer: {e}"),
        },
    }

    Ok(())
}
