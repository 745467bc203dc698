//! Dispatch module exports.
//!
//! Re-exports the command trait, the command table and the request
//! dispatcher so downstream consumers can depend on this module directly.

pub mod command;
pub mod dispatcher;
pub mod table;

pub use command::{Command, Services, StatsSettings};
pub use dispatcher::RequestDispatcher;
pub use table::CommandTable;
