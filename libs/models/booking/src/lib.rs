//! The booking state machine
//!
//! Every transition runs in a single database transaction that locks the
//! booking row, checks the move against
//! [`BookingStatus::can_transition_to`], applies the matching slot change
//! through [`slot::transitions`] and writes the new booking status. Any
//! failure rolls back both rows.

#[macro_use]
extern crate tracing;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use common::{DbConn, Error};
use db::{BookingStatus, PaymentStatus, booking, vehicle};
use diesel::prelude::*;
use primitive_booking::PrimitiveBooking;
use primitive_slot::PrimitiveSlot;
use primitive_vehicle::PrimitiveVehicle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use slot::transitions;

mod event;
pub mod fee;

pub use event::BookingEvent;
pub use fee::FeeQuote;

pub type JoinedBookingData =
	(PrimitiveBooking, PrimitiveVehicle, Option<PrimitiveSlot>);

/// How the requested window of a new booking is derived
#[derive(Clone, Copy, Debug)]
pub struct WindowPolicy {
	/// Time between the request and the requested start
	pub lead_time:        TimeDelta,
	/// Length of the requested window
	pub default_duration: TimeDelta,
}

impl WindowPolicy {
	/// Compute the `(start, end)` window for a request made at `now`
	#[must_use]
	pub fn window(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
		let start = now + self.lead_time;

		(start, start + self.default_duration)
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
	pub status: Option<BookingStatus>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Booking {
	pub booking: PrimitiveBooking,
	pub vehicle: PrimitiveVehicle,
	pub slot:    Option<PrimitiveSlot>,
}

/// The outcome of a committed transition
#[derive(Clone, Debug)]
pub struct Transition {
	pub booking: Booking,
	pub event:   BookingEvent,
}

/// Columns a transition may write next to the status
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = booking)]
struct BookingChanges {
	slot_id:               Option<Option<i32>>,
	actual_check_in_time:  Option<NaiveDateTime>,
	actual_check_out_time: Option<NaiveDateTime>,
	amount:                Option<Decimal>,
	payment_status:        Option<PaymentStatus>,
	payment_method:        Option<String>,
	payment_date:          Option<NaiveDateTime>,
	admin_remarks:         Option<String>,
}

mod auto_type_helpers {
	pub use diesel::dsl::{LeftJoin as LeftOuterJoin, *};
}

/// Reject empty or whitespace-only remarks
fn required_remarks(remarks: String, action: &str) -> Result<String, Error> {
	let trimmed = remarks.trim();

	if trimmed.is_empty() {
		return Err(Error::ValidationError(format!(
			"adminRemarks is required when {action} a booking"
		)));
	}

	Ok(trimmed.to_string())
}

impl Booking {
	/// Build a query joining a booking with its vehicle and bound slot
	#[diesel::dsl::auto_type(no_type_alias, dsl_path = "auto_type_helpers")]
	fn joined_query() -> _ {
		booking::table
			.inner_join(vehicle::table)
			.left_outer_join(db::slot::table)
	}

	fn from_joined(data: JoinedBookingData) -> Self {
		Self { booking: data.0, vehicle: data.1, slot: data.2 }
	}

	/// Load a [`Booking`] on an open connection
	fn find(b_id: i32, conn: &mut PgConnection) -> Result<Self, Error> {
		let booking = Self::joined_query()
			.filter(booking::id.eq(b_id))
			.select((
				PrimitiveBooking::as_select(),
				PrimitiveVehicle::as_select(),
				db::slot::all_columns.nullable(),
			))
			.get_result::<JoinedBookingData>(conn)
			.optional()?
			.ok_or_else(|| Error::NotFound(format!("booking with id {b_id}")))?;

		Ok(Self::from_joined(booking))
	}

	/// Get a [`Booking`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		conn.interact(move |conn| Self::find(b_id, conn)).await?
	}

	/// Get all bookings of a user, newest first
	#[instrument(skip(conn))]
	pub async fn for_user(
		u_id: i32,
		filter: BookingFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let query = Self::joined_query();

		let bookings = conn
			.interact(move |conn| {
				let mut query = query
					.filter(booking::user_id.eq(u_id))
					.select((
						PrimitiveBooking::as_select(),
						PrimitiveVehicle::as_select(),
						db::slot::all_columns.nullable(),
					))
					.order((booking::created_at.desc(), booking::id.desc()))
					.into_boxed();

				if let Some(status) = filter.status {
					query = query.filter(booking::status.eq(status));
				}

				query.load::<JoinedBookingData>(conn)
			})
			.await??
			.into_iter()
			.map(Self::from_joined)
			.collect();

		Ok(bookings)
	}

	/// Get all bookings awaiting approval, oldest first
	#[instrument(skip(conn))]
	pub async fn pending(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let query = Self::joined_query();

		let bookings = conn
			.interact(move |conn| {
				query
					.filter(booking::status.eq(BookingStatus::PendingApproval))
					.select((
						PrimitiveBooking::as_select(),
						PrimitiveVehicle::as_select(),
						db::slot::all_columns.nullable(),
					))
					.order((booking::created_at.asc(), booking::id.asc()))
					.load::<JoinedBookingData>(conn)
			})
			.await??
			.into_iter()
			.map(Self::from_joined)
			.collect();

		Ok(bookings)
	}

	/// Write `next` and `changes` to a booking locked by the current
	/// transaction
	fn advance(
		current: &PrimitiveBooking,
		next: BookingStatus,
		changes: BookingChanges,
		now: NaiveDateTime,
		conn: &mut PgConnection,
	) -> Result<PrimitiveBooking, Error> {
		use self::booking::dsl::*;

		current.ensure_transition(next)?;

		let updated = diesel::update(
			booking.find(current.id).filter(status.eq(current.status)),
		)
		.set((status.eq(next), updated_at.eq(now), changes))
		.returning(PrimitiveBooking::as_returning())
		.get_result(conn)
		.optional()?
		.ok_or_else(|| {
			Error::InvalidState(format!(
				"booking {} changed status concurrently",
				current.id
			))
		})?;

		if updated.status.references_slot() != updated.slot_id.is_some() {
			return Err(Error::Infallible(format!(
				"booking {} is {} with slot {:?}",
				updated.id, updated.status, updated.slot_id,
			)));
		}

		Ok(updated)
	}

	/// Run a transition closure in a transaction and load the result
	///
	/// The booking is reloaded before the transaction commits, so a committed
	/// transition always comes back with its event.
	async fn commit<F>(b_id: i32, conn: &DbConn, f: F) -> Result<Transition, Error>
	where
		F: FnOnce(&mut PgConnection) -> Result<BookingEvent, Error>
			+ Send
			+ 'static,
	{
		let (booking, event) = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(move |conn| {
					let event = f(conn)?;
					let booking = Self::find(b_id, conn)?;

					Ok((booking, event))
				})
			})
			.await??;

		info!(
			"booking {b_id} moved from {:?} to {} (slot {:?})",
			event.from, event.to, event.slot_id,
		);

		Ok(Transition { booking, event })
	}

	/// Approve a pending booking and bind a slot to it
	///
	/// With `s_id` the given slot is reserved, without it the first
	/// available compatible slot is.
	///
	/// # Errors
	/// Fails with [`Error::InvalidState`] if the booking is not pending and
	/// with [`Error::SlotUnavailable`] if no slot can be reserved
	#[instrument(skip(conn))]
	pub async fn approve(
		b_id: i32,
		s_id: Option<i32>,
		remarks: Option<String>,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			current.ensure_transition(BookingStatus::Confirmed)?;

			let vehicle = PrimitiveVehicle::find(current.vehicle_id, conn)?
				.ok_or_else(|| {
					Error::NotFound(format!(
						"vehicle with id {}",
						current.vehicle_id
					))
				})?;

			let reserved = match s_id {
				Some(s_id) => {
					transitions::reserve_compatible(
						s_id,
						vehicle.vehicle_type,
						conn,
					)?
				},
				None => {
					transitions::reserve_first_compatible(
						vehicle.vehicle_type,
						conn,
					)?
				},
			};

			let changes = BookingChanges {
				slot_id: Some(Some(reserved.id)),
				admin_remarks: remarks
					.map(|r| r.trim().to_string())
					.filter(|r| !r.is_empty()),
				..Default::default()
			};

			let updated = Self::advance(
				&current,
				BookingStatus::Confirmed,
				changes,
				now,
				conn,
			)?;

			Ok(BookingEvent::transitioned(&current, &updated))
		})
		.await
	}

	/// Reject a pending booking, `remarks` must not be empty
	#[instrument(skip(conn))]
	pub async fn reject(
		b_id: i32,
		remarks: String,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		let remarks = required_remarks(remarks, "rejecting")?;

		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			let changes = BookingChanges {
				admin_remarks: Some(remarks),
				..Default::default()
			};

			let updated = Self::advance(
				&current,
				BookingStatus::Rejected,
				changes,
				now,
				conn,
			)?;

			Ok(BookingEvent::transitioned(&current, &updated))
		})
		.await
	}

	/// Cancel a booking on behalf of its owner
	///
	/// A slot bound by an earlier approval is released first.
	#[instrument(skip(conn))]
	pub async fn cancel_by_user(
		b_id: i32,
		u_id: i32,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			current.ensure_owned_by(u_id)?;

			Self::cancel(&current, BookingStatus::CancelledByUser, None, now, conn)
		})
		.await
	}

	/// Cancel a pending or confirmed booking administratively
	#[instrument(skip(conn))]
	pub async fn cancel_by_admin(
		b_id: i32,
		remarks: String,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		let remarks = required_remarks(remarks, "cancelling")?;

		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			Self::cancel(
				&current,
				BookingStatus::CancelledByAdmin,
				Some(remarks),
				now,
				conn,
			)
		})
		.await
	}

	fn cancel(
		current: &PrimitiveBooking,
		next: BookingStatus,
		remarks: Option<String>,
		now: NaiveDateTime,
		conn: &mut PgConnection,
	) -> Result<BookingEvent, Error> {
		current.ensure_transition(next)?;

		Self::release_held_slot(current, conn)?;

		let changes = BookingChanges {
			slot_id: Some(None),
			admin_remarks: remarks,
			..Default::default()
		};

		let updated = Self::advance(current, next, changes, now, conn)?;

		Ok(BookingEvent::transitioned(current, &updated))
	}

	/// Mark the arrival of a confirmed booking and occupy its slot
	#[instrument(skip(conn))]
	pub async fn check_in(b_id: i32, conn: &DbConn) -> Result<Transition, Error> {
		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			current.ensure_transition(BookingStatus::ActiveParking)?;

			let Some(bound) = current.slot_id else {
				return Err(Error::InvalidState(format!(
					"booking {b_id} has no slot to check in to"
				)));
			};

			transitions::mark_occupied(bound, conn)?;

			let changes = BookingChanges {
				actual_check_in_time: Some(now),
				..Default::default()
			};

			let updated = Self::advance(
				&current,
				BookingStatus::ActiveParking,
				changes,
				now,
				conn,
			)?;

			Ok(BookingEvent::transitioned(&current, &updated))
		})
		.await
	}

	/// End an active stay without billing and free the slot
	#[instrument(skip(conn))]
	pub async fn check_out(
		b_id: i32,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			current.ensure_transition(BookingStatus::Completed)?;

			Self::release_held_slot(&current, conn)?;

			let changes = BookingChanges {
				actual_check_out_time: Some(now),
				..Default::default()
			};

			let updated = Self::advance(
				&current,
				BookingStatus::Completed,
				changes,
				now,
				conn,
			)?;

			Ok(BookingEvent::transitioned(&current, &updated))
		})
		.await
	}

	/// Compute what paying for an active booking would cost right now
	///
	/// Nothing is written, a later [`Booking::pay`] bills up to its own
	/// commit time.
	#[instrument(skip(conn))]
	pub async fn quote(
		b_id: i32,
		u_id: i32,
		hourly_rate: Decimal,
		conn: &DbConn,
	) -> Result<FeeQuote, Error> {
		let current = PrimitiveBooking::get_by_id(b_id, conn).await?;

		current.ensure_owned_by(u_id)?;
		current.ensure_transition(BookingStatus::Paid)?;

		let check_in = Self::checked_in_at(&current)?;
		let now = Utc::now().naive_utc();

		Ok(FeeQuote::new(check_in, now, hourly_rate))
	}

	/// Bill an active booking up to now, record the payment and free the
	/// slot
	#[instrument(skip(conn))]
	pub async fn pay(
		b_id: i32,
		u_id: i32,
		method: String,
		hourly_rate: Decimal,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		Self::commit(b_id, conn, move |conn| {
			let now = Utc::now().naive_utc();
			let current = PrimitiveBooking::lock(b_id, conn)?;

			current.ensure_owned_by(u_id)?;
			current.ensure_transition(BookingStatus::Paid)?;

			let check_in = Self::checked_in_at(&current)?;
			let amount = fee::compute(check_in, now, hourly_rate);

			Self::release_held_slot(&current, conn)?;

			let changes = BookingChanges {
				actual_check_out_time: Some(now),
				amount: Some(amount),
				payment_status: Some(PaymentStatus::Paid),
				payment_method: Some(method),
				payment_date: Some(now),
				..Default::default()
			};

			let updated = Self::advance(
				&current,
				BookingStatus::Paid,
				changes,
				now,
				conn,
			)?;

			Ok(BookingEvent::transitioned(&current, &updated))
		})
		.await
	}

	/// Free the slot a booking reserved or occupies, if any
	fn release_held_slot(
		current: &PrimitiveBooking,
		conn: &mut PgConnection,
	) -> Result<(), Error> {
		let held = current.slot_id.filter(|_| current.status.holds_slot());

		if let Some(bound) = held {
			transitions::mark_released(bound, conn)?;
		}

		Ok(())
	}

	fn checked_in_at(current: &PrimitiveBooking) -> Result<NaiveDateTime, Error> {
		current.actual_check_in_time.ok_or_else(|| {
			Error::Infallible(format!(
				"active booking {} has no check-in time",
				current.id
			))
		})
	}
}

/// A booking request as made by a vehicle owner
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewBooking {
	pub user_id:    i32,
	pub vehicle_id: i32,
	pub notes:      Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = booking)]
struct InsertableNewBooking {
	user_id:              i32,
	vehicle_id:           i32,
	status:               BookingStatus,
	requested_start_time: NaiveDateTime,
	requested_end_time:   NaiveDateTime,
	notes:                Option<String>,
	created_at:           NaiveDateTime,
	updated_at:           NaiveDateTime,
}

impl NewBooking {
	/// Insert this [`NewBooking`] as a pending request
	///
	/// # Errors
	/// Fails with [`Error::NotFound`] if the vehicle does not exist and with
	/// [`Error::Forbidden`] if the user does not own it
	#[instrument(skip(conn))]
	pub async fn insert(
		self,
		policy: WindowPolicy,
		conn: &DbConn,
	) -> Result<Transition, Error> {
		PrimitiveVehicle::get_owned(self.vehicle_id, self.user_id, conn).await?;

		let now = Utc::now().naive_utc();
		let (start, end) = policy.window(now);

		let new_booking = InsertableNewBooking {
			user_id:              self.user_id,
			vehicle_id:           self.vehicle_id,
			status:               BookingStatus::PendingApproval,
			requested_start_time: start,
			requested_end_time:   end,
			notes:                self.notes,
			created_at:           now,
			updated_at:           now,
		};

		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(move |conn| {
					let inserted = diesel::insert_into(booking::table)
						.values(new_booking)
						.returning(PrimitiveBooking::as_returning())
						.get_result::<PrimitiveBooking>(conn)?;

					Booking::find(inserted.id, conn)
				})
			})
			.await??;

		info!(
			"created booking {} for vehicle {} of user {}",
			booking.booking.id, booking.booking.vehicle_id, booking.booking.user_id
		);

		let event = BookingEvent::created(&booking.booking);

		Ok(Transition { booking, event })
	}
}
