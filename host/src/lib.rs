//! Host for the todo list core.
//!
//! # Overview
//! Supplies what the core leaves to its host: configuration, a real HTTP
//! `Transport` (reqwest), and a server-rendered UI that turns form posts into
//! controller operations.

pub mod config;
pub mod routes;
pub mod transport;

pub use config::Config;
pub use routes::{router, watch_error, SharedApp};
pub use transport::ReqwestTransport;
