#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{BookingStatus, PaymentStatus, booking};
use diesel::pg::Pg;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveBooking {
	pub id:                    i32,
	pub user_id:               i32,
	pub vehicle_id:            i32,
	pub slot_id:               Option<i32>,
	pub status:                BookingStatus,
	pub requested_start_time:  NaiveDateTime,
	pub requested_end_time:    NaiveDateTime,
	pub actual_check_in_time:  Option<NaiveDateTime>,
	pub actual_check_out_time: Option<NaiveDateTime>,
	pub amount:                Option<Decimal>,
	pub payment_status:        PaymentStatus,
	pub payment_method:        Option<String>,
	pub payment_date:          Option<NaiveDateTime>,
	pub notes:                 Option<String>,
	pub admin_remarks:         Option<String>,
	pub created_at:            NaiveDateTime,
	pub updated_at:            NaiveDateTime,
}

impl PrimitiveBooking {
	/// Get a [`PrimitiveBooking`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking
					.find(b_id)
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| {
				Error::NotFound(format!("booking with id {b_id}"))
			})?;

		Ok(booking)
	}

	/// Lock a booking row for the rest of the current transaction
	///
	/// Concurrent transitions on the same booking queue up behind this lock
	/// and observe the status written by whoever held it first
	pub fn lock(
		b_id: i32,
		conn: &mut PgConnection,
	) -> Result<Self, Error> {
		use self::booking::dsl::*;

		booking
			.find(b_id)
			.select(Self::as_select())
			.for_update()
			.get_result(conn)
			.optional()?
			.ok_or_else(|| Error::NotFound(format!("booking with id {b_id}")))
	}

	/// Make sure this booking belongs to the given user
	///
	/// # Errors
	/// Fails with [`Error::Forbidden`] if it does not
	pub fn ensure_owned_by(&self, u_id: i32) -> Result<(), Error> {
		if self.user_id != u_id {
			warn!("user {u_id} tried to act on booking {} of another user", self.id);

			return Err(Error::Forbidden);
		}

		Ok(())
	}

	/// Make sure this booking may move directly to `next`
	///
	/// # Errors
	/// Fails with [`Error::InvalidState`] naming the booking and both
	/// statuses if it may not
	pub fn ensure_transition(&self, next: BookingStatus) -> Result<(), Error> {
		if self.status.is_terminal() {
			return Err(Error::InvalidState(format!(
				"booking {} is {} and can no longer change",
				self.id, self.status,
			)));
		}

		if !self.status.can_transition_to(next) {
			return Err(Error::InvalidState(format!(
				"booking {} is {} and cannot become {next}",
				self.id, self.status,
			)));
		}

		Ok(())
	}
}
