// Author: Dustin Pilgrim
// License: MIT

use super::IpcContext;
use crate::sinfo;

/// Handle `chatimer shutdown`: ask the daemon to exit cleanly.
/// Running countdowns are dropped with the process; nothing is persisted.
pub fn handle_shutdown(ctx: &IpcContext) -> String {
    sinfo!("IPC", "shutdown requested");
    ctx.shutdown.send_replace(true);
    "Stopping chatimer daemon".to_string()
}
