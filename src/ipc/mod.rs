// Author: Dustin Pilgrim
// License: MIT

pub mod client;
pub mod handlers;
pub mod router;
pub mod server;

use std::path::PathBuf;

/// `$XDG_RUNTIME_DIR`, or the system temp dir when it is not set.
pub fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

pub fn default_socket_path() -> PathBuf {
    runtime_dir().join("chatimer").join("chatimer.sock")
}
