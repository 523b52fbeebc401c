use std::str::FromStr;
use std::sync::Arc;

use booking::WindowPolicy;
use chrono::TimeDelta;
use deadpool_diesel::postgres::{Manager, Pool};
use rust_decimal::Decimal;
use tracing::Level;

use crate::notifier::StubOutbox;

#[derive(Clone, Debug)]
pub struct Config {
	pub database_url: String,
	pub bind_address: String,
	pub log_level:    Level,

	pub hourly_rate:              Decimal,
	pub booking_lead_time:        TimeDelta,
	pub booking_default_duration: TimeDelta,

	pub event_queue_size: usize,
	pub event_sink:       String,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	fn get_env_var_or<T>(var: &str, default: T) -> T
	where
		T: FromStr,
	{
		match std::env::var(var) {
			Ok(value) => {
				value.parse::<T>().unwrap_or_else(|_| {
					panic!("{var} has an invalid value: {value}")
				})
			},
			Err(_) => default,
		}
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if `DATABASE_URL` is missing, any variable fails to parse or
	/// [`Config::validate`] rejects a value
	#[must_use]
	pub fn from_env() -> Self {
		let database_url = Self::get_env_var("DATABASE_URL");
		let bind_address =
			Self::get_env_var_or("BIND_ADDRESS", "0.0.0.0:80".to_string());
		let log_level = Self::get_env_var_or("LOG_LEVEL", Level::INFO);

		let hourly_rate =
			Self::get_env_var_or("HOURLY_RATE", Decimal::new(200, 2));
		let booking_lead_time = TimeDelta::minutes(Self::get_env_var_or(
			"BOOKING_LEAD_TIME_MINUTES",
			15,
		));
		let booking_default_duration = TimeDelta::minutes(
			Self::get_env_var_or("BOOKING_DEFAULT_DURATION_MINUTES", 120),
		);

		let event_queue_size = Self::get_env_var_or("EVENT_QUEUE_SIZE", 1024);
		let event_sink = Self::get_env_var_or("EVENT_SINK", "log".to_string());

		let config = Self {
			database_url,
			bind_address,
			log_level,
			hourly_rate,
			booking_lead_time,
			booking_default_duration,
			event_queue_size,
			event_sink,
		};

		config.validate();

		config
	}

	/// Check the values the rest of the app relies on
	///
	/// # Panics
	/// Panics if a rate, duration or queue size is out of range
	pub fn validate(&self) {
		assert!(
			!self.hourly_rate.is_sign_negative(),
			"HOURLY_RATE must not be negative: {}",
			self.hourly_rate,
		);
		assert!(
			self.booking_lead_time >= TimeDelta::zero(),
			"BOOKING_LEAD_TIME_MINUTES must not be negative",
		);
		assert!(
			self.booking_default_duration > TimeDelta::zero(),
			"BOOKING_DEFAULT_DURATION_MINUTES must be positive",
		);
		assert!(self.event_queue_size > 0, "EVENT_QUEUE_SIZE must be positive");
		assert!(
			matches!(self.event_sink.as_str(), "log" | "stub"),
			"EVENT_SINK must be log or stub, got {}",
			self.event_sink,
		);
	}

	/// The policy used to derive the requested window of new bookings
	#[must_use]
	pub fn window_policy(&self) -> WindowPolicy {
		WindowPolicy {
			lead_time:        self.booking_lead_time,
			default_duration: self.booking_default_duration,
		}
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}

	/// Create a stub outbox if events should not leave the process
	#[must_use]
	pub fn create_stub_outbox(&self) -> Option<Arc<StubOutbox>> {
		if self.event_sink == "stub" {
			Some(Arc::new(StubOutbox::default()))
		} else {
			None
		}
	}
}
