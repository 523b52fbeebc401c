//! # Parkwise backend library

#[macro_use]
extern crate tracing;

use axum::extract::FromRef;
use common::DbPool;
use notifier::Notifier;

mod caller;
mod config;

pub mod controllers;
pub mod notifier;
pub mod routes;
pub mod schemas;

pub use caller::*;
pub use config::*;

/// Common state of the app
#[derive(Clone)]
pub struct AppState {
	pub config:        Config,
	pub database_pool: DbPool,
	pub notifier:      Notifier,
}

impl FromRef<AppState> for Config {
	fn from_ref(input: &AppState) -> Self { input.config.clone() }
}

impl FromRef<AppState> for DbPool {
	fn from_ref(input: &AppState) -> Self { input.database_pool.clone() }
}

impl FromRef<AppState> for Notifier {
	fn from_ref(input: &AppState) -> Self { input.notifier.clone() }
}
