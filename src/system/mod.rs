//! System-level modules
//!
//! Process-wide concerns shared by every execution mode.

pub mod logging;
