// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use eyre::{Result, WrapErr, eyre};

use crate::cli::Args;
use crate::core::event_log::FileEventLog;
use crate::core::machine::TimerMachine;
use crate::core::presenter::BroadcastPresenter;
use crate::core::store::MemoryStore;
use crate::ipc::handlers::IpcContext;
use crate::log_rotate::{self, LogPolicy};
use crate::{serror, sinfo, swarn};

const PRESENTER_CAPACITY: usize = 256;

pub async fn run(args: Args) -> Result<()> {
    let loaded = crate::config::load(args.config.as_deref())?;
    let cfg = loaded.cfg;
    let verbose = args.verbose || cfg.verbose;

    // diagnostic log
    let needs_blank = log_rotate::prepare_log_file(&cfg.diagnostic_log, LogPolicy::default())
        .unwrap_or(false);
    let _ = log_rotate::write_run_header(&cfg.diagnostic_log, needs_blank);
    crate::log::init(&cfg.diagnostic_log, verbose);

    match &loaded.path {
        Some(p) => sinfo!("Chatimer", "config loaded from {}", p.display()),
        None => sinfo!("Chatimer", "no config file found, using defaults"),
    }

    // single-instance
    let lock_path = crate::app::platform::lock_path();
    let _instance_lock = crate::app::platform::acquire_single_instance_lock(&lock_path)
        .map_err(|e| {
            serror!("Chatimer", "{}", e);
            eyre!(e)
        })?;

    if let Some(parent) = cfg.event_log.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    sinfo!("Chatimer", "event log: {}", cfg.event_log.display());

    let presenter = Arc::new(BroadcastPresenter::new(PRESENTER_CAPACITY));
    let machine = TimerMachine::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FileEventLog::new(cfg.event_log.clone())),
        presenter.clone(),
    );

    // shutdown
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    let ctx = IpcContext {
        machine,
        presenter,
        shutdown: shutdown_tx.clone(),
    };
    let server = crate::ipc::server::spawn_ipc_server(ctx, &cfg.socket).await?;

    sinfo!("Chatimer", "chatimer started");

    tokio::select! {
        _ = shutdown_rx.wait_for(|stop| *stop) => {
            sinfo!("Chatimer", "shutdown requested over IPC");
        }

        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                swarn!("Chatimer", "failed to listen for Ctrl+C: {}", e);
            }
            sinfo!("Chatimer", "received Ctrl+C, shutting down");
            // Closes open watch streams.
            shutdown_tx.send_replace(true);
        }
    }

    server.abort();
    let _ = std::fs::remove_file(&cfg.socket);
    let _ = std::fs::remove_file(&lock_path);

    sinfo!("Chatimer", "chatimer stopped");
    Ok(())
}
