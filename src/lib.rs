// lib.rs - library root shared by the server binary and the tests
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod paypal;
pub mod providers;
pub mod types;

use std::sync::Arc;

/// Shared application state. Built once in `main`, then read-only: the
/// dispatcher's credentials and the PayPal client never change after
/// startup, so request handlers share it without locking.
pub struct AppState {
    pub dispatcher: dispatcher::Dispatcher,
    pub paypal: Option<paypal::PayPalClient>,
    pub config: config::Config,
}

pub type SharedState = Arc<AppState>;
