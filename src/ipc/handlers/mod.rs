// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use tokio::sync::watch;

use crate::core::machine::TimerMachine;
use crate::core::presenter::BroadcastPresenter;

pub mod event;
pub mod shutdown;
pub mod status;
pub mod watch_session;

/// Everything a connection handler needs. Cloned into every connection task.
#[derive(Clone)]
pub struct IpcContext {
    pub machine: TimerMachine,
    pub presenter: Arc<BroadcastPresenter>,
    pub shutdown: watch::Sender<bool>,
}
