//! Top-level facade crate for tsdadmin.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use tsdadmin_core::*;
}

pub mod server {
    pub use tsdadmin_server::*;
}
