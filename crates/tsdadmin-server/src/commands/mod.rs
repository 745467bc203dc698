//! Built-in admin commands.
//!
//! | key         | effect                                  |
//! |-------------|-----------------------------------------|
//! | `diediedie` | flush, close connections, shut down     |
//! | `stats`     | one line per metric of every component  |
//! | `version`   | build metadata, text or JSON            |

pub mod shutdown;
pub mod stats;
pub mod version;

pub use shutdown::Shutdown;
pub use stats::Stats;
pub use version::Version;
