//! Library-wide error types and [`From`] impls

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Duplicate resource created
	#[error("{0}")]
	Duplicate(String),
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// An error that should never happen
	#[error("{0}")]
	Infallible(String),
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// The entity is not in a state that permits the operation
	#[error("invalid state - {0}")]
	InvalidState(String),
	/// No caller identity was passed along with the request
	#[error("missing or invalid caller identity")]
	MissingCaller,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// The requested slot cannot be bound
	#[error(transparent)]
	SlotUnavailable(#[from] SlotUnavailableError),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever increase,
	/// an error code should never be reused once its assigned
	fn code(&self) -> i32 {
		match self {
			Self::Duplicate(_) => 1,
			Self::Forbidden => 2,
			Self::Infallible(_) => 3,
			Self::InternalServerError => 4,
			Self::NotFound(_) => 5,
			Self::ValidationError(_) => 6,
			Self::InvalidState(_) => 7,
			Self::MissingCaller => 8,
			Self::SlotUnavailable(e) => {
				match e {
					SlotUnavailableError::NotAvailable { .. } => 9,
					SlotUnavailableError::Incompatible { .. } => 10,
					SlotUnavailableError::NoCompatibleSlot => 11,
				}
			},
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::Duplicate(m)
			| Self::InvalidState(m)
			| Self::NotFound(m)
			| Self::ValidationError(m) => Some(m.to_owned()),
			Self::SlotUnavailable(e) => {
				match e {
					SlotUnavailableError::NotAvailable { slot_id }
					| SlotUnavailableError::Incompatible { slot_id } => {
						Some(serde_json::json!({"slotId": slot_id}).to_string())
					},
					SlotUnavailableError::NoCompatibleSlot => None,
				}
			},
			_ => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		debug!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match self {
			Self::Duplicate(_)
			| Self::InvalidState(_)
			| Self::SlotUnavailable(_) => StatusCode::CONFLICT,
			Self::InternalServerError | Self::Infallible(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
			Self::MissingCaller => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Reasons a slot could not be bound to a booking
#[derive(Debug, Error)]
pub enum SlotUnavailableError {
	/// The slot exists but is not currently available
	#[error("slot {slot_id} is not available")]
	NotAvailable { slot_id: i32 },
	/// The slot cannot hold the booking's vehicle type
	#[error("slot {slot_id} is not compatible with the vehicle")]
	Incompatible { slot_id: i32 },
	/// No available slot can hold the vehicle type
	#[error("no compatible slot is available")]
	NoCompatibleSlot,
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Unknown database constraint violation
	#[error("constraint error -- {0:?}")]
	ConstraintError(String),
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map of unique constraint names to user facing messages.
static CONSTRAINT_TO_MESSAGE: LazyLock<HashMap<&str, &str>> =
	LazyLock::new(|| {
		HashMap::from([
			("slot_number_key", "slot number is already in use"),
			("booking_open_vehicle_key", "vehicle already has an open booking"),
			("booking_active_slot_key", "slot is already bound to a booking"),
		])
	});

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				let Some(constraint_name) = info.constraint_name() else {
					return InternalServerError::DatabaseError(err).into();
				};

				match CONSTRAINT_TO_MESSAGE.get(constraint_name) {
					Some(message) => Self::Duplicate((*message).to_string()),
					None => {
						InternalServerError::ConstraintError(
							constraint_name.to_string(),
						)
						.into()
					},
				}
			},
			// Check constraint violation, the row would break a lifecycle
			// invariant
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::CheckViolation,
				info,
			) => Self::InvalidState(info.message().to_string()),
			// Foreign key constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::ForeignKeyViolation,
				info,
			) => Self::ValidationError(info.message().to_string()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}
