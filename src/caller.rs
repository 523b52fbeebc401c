//! Caller identity as forwarded by the authenticating gateway

use std::str::FromStr;

use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::Error;
use serde::{Deserialize, Serialize};

use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	Owner,
	Allocator,
	Admin,
}

impl FromStr for Role {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"owner" => Ok(Self::Owner),
			"allocator" => Ok(Self::Allocator),
			"admin" => Ok(Self::Admin),
			_ => Err(Error::MissingCaller),
		}
	}
}

/// Any authenticated caller
///
/// ```rs
/// pub async fn foo_route(caller: Caller) -> impl IntoResponse {
///     println!("{:?}", caller.user_id);
///
///     ()
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Caller {
	pub user_id: i32,
	pub role:    Role,
}

/// A caller allowed to allocate slots and manage bookings of others
#[derive(Clone, Copy, Debug)]
pub struct StaffCaller {
	pub user_id: i32,
	pub role:    Role,
}

impl Caller {
	#[must_use]
	pub fn is_staff(&self) -> bool {
		matches!(self.role, Role::Allocator | Role::Admin)
	}

	fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, Error> {
		parts
			.headers
			.get(name)
			.and_then(|v| v.to_str().ok())
			.map(str::trim)
			.ok_or_else(|| {
				debug!("missing or unreadable {name} header");

				Error::MissingCaller
			})
	}
}

impl FromRequestParts<AppState> for Caller {
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let user_id = Self::header(parts, USER_ID_HEADER)?
			.parse::<i32>()
			.map_err(|_| Error::MissingCaller)?;

		let role = Self::header(parts, USER_ROLE_HEADER)?.parse::<Role>()?;

		Ok(Self { user_id, role })
	}
}

impl FromRequestParts<AppState> for StaffCaller {
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let caller = parts.extract_with_state::<Caller, AppState>(state).await?;

		if !caller.is_staff() {
			debug!("user {} is not staff", caller.user_id);

			return Err(Error::Forbidden);
		}

		Ok(Self { user_id: caller.user_id, role: caller.role })
	}
}
