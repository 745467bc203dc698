//! tsdadmin server library entry.
//!
//! This crate wires the query context, the command table, the request
//! dispatcher, the built-in admin commands and their collaborators into an
//! axum application. It is consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod collab;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod query;
pub mod server;
