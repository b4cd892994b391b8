//! roster: admin user management for a server-rendered panel.
//!
//! The server half (store, admin operations, HTTP handlers) only builds on
//! native targets. The `console` module is the script side of the admin
//! page and builds everywhere; on `wasm32` it binds to the browser DOM.

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod console;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod handlers;
pub mod models;
#[cfg(not(target_arch = "wasm32"))]
pub mod routes;
#[cfg(not(target_arch = "wasm32"))]
pub mod services;
pub mod templates;
