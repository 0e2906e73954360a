// CGI command API
//
// Hand-written client for the router's `cmd`-numbered JSON endpoint.
// Covers session management, device state reads and the handful of
// mutations that have typed wrappers.

pub mod client;
pub mod commands;
pub mod models;

mod device;
mod session;

pub use client::{CgiClient, DEFAULT_CGI_PATH};
