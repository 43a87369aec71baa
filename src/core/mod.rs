// Author: Dustin Pilgrim
// License: MIT

pub mod error;
pub mod event_log;
pub mod inbound;
pub mod machine;
pub mod messages;
pub mod presenter;
pub mod router;
pub mod session;
pub mod store;
pub mod timer;
