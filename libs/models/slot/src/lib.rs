//! The slot allocator
//!
//! Slots only change status through the atomic operations in
//! [`transitions`]; the async functions on [`Slot`] wrap them in their own
//! transaction for callers that are not already inside one.

#[macro_use]
extern crate tracing;

use common::{DbConn, Error};
use db::{BookingStatus, SlotStatus, SlotType, VehicleType, booking, slot};
use diesel::prelude::*;
use primitive_booking::PrimitiveBooking;
use primitive_slot::PrimitiveSlot;
use serde::{Deserialize, Serialize};

mod compatibility;
pub mod transitions;

pub use compatibility::is_compatible;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFilter {
	pub status:    Option<SlotStatus>,
	pub slot_type: Option<SlotType>,
}

/// A slot together with the booking currently holding it, if any
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Slot {
	pub slot:     PrimitiveSlot,
	pub occupant: Option<PrimitiveBooking>,
}

impl Slot {
	/// Load the bookings currently holding any of the given slots
	fn load_occupants(
		slot_ids: &[i32],
		conn: &mut PgConnection,
	) -> QueryResult<Vec<PrimitiveBooking>> {
		use self::booking::dsl::*;

		booking
			.filter(slot_id.eq_any(slot_ids))
			.filter(status.eq_any(BookingStatus::HOLDING_SLOT))
			.select(PrimitiveBooking::as_select())
			.load(conn)
	}

	/// Pair each slot with the booking holding it
	fn with_occupants(
		slots: Vec<PrimitiveSlot>,
		conn: &mut PgConnection,
	) -> QueryResult<Vec<Self>> {
		let ids = slots.iter().map(|s| s.id).collect::<Vec<_>>();
		let mut occupants = Self::load_occupants(&ids, conn)?;

		let slots = slots
			.into_iter()
			.map(|slot| {
				let occupant = occupants
					.iter()
					.position(|b| b.slot_id == Some(slot.id))
					.map(|idx| occupants.swap_remove(idx));

				Self { slot, occupant }
			})
			.collect();

		Ok(slots)
	}

	/// Get a [`Slot`] and its occupant given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(s_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let slot = conn
			.interact(move |conn| {
				let Some(slot) = PrimitiveSlot::find(s_id, conn)? else {
					return Ok(None);
				};

				Self::with_occupants(vec![slot], conn).map(|mut s| s.pop())
			})
			.await??
			.ok_or_else(|| Error::NotFound(format!("slot with id {s_id}")))?;

		Ok(slot)
	}

	/// Get all slots matching a filter, in allocation order
	#[instrument(skip(conn))]
	pub async fn get_all(
		filter: SlotFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let slots = conn
			.interact(move |conn| {
				let mut query = slot::table.into_boxed();

				if let Some(status) = filter.status {
					query = query.filter(slot::status.eq(status));
				}

				if let Some(slot_type) = filter.slot_type {
					query = query.filter(slot::slot_type.eq(slot_type));
				}

				let slots = query
					.order((
						slot::row_label.asc(),
						slot::position.asc(),
						slot::id.asc(),
					))
					.select(PrimitiveSlot::as_select())
					.load(conn)?;

				Self::with_occupants(slots, conn)
			})
			.await??;

		Ok(slots)
	}

	/// Find the slot automatic assignment would pick for a vehicle type
	///
	/// Repeated calls against the same inventory return the same slot.
	#[instrument(skip(conn))]
	pub async fn find_compatible(
		vehicle: VehicleType,
		conn: &DbConn,
	) -> Result<Option<PrimitiveSlot>, Error> {
		let slot = conn
			.interact(move |conn| {
				transitions::compatible_candidates(vehicle, conn)
					.map(|candidates| candidates.into_iter().next())
			})
			.await??;

		Ok(slot)
	}

	/// Atomically reserve an available slot
	#[instrument(skip(conn))]
	pub async fn reserve(
		s_id: i32,
		conn: &DbConn,
	) -> Result<PrimitiveSlot, Error> {
		let slot = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					transitions::mark_reserved(s_id, conn)
				})
			})
			.await??;

		info!("reserved slot {}", slot.number);

		Ok(slot)
	}

	/// Make a slot available again, releasing a free slot is a no-op
	#[instrument(skip(conn))]
	pub async fn release(
		s_id: i32,
		conn: &DbConn,
	) -> Result<PrimitiveSlot, Error> {
		let slot = conn
			.interact(move |conn| transitions::mark_released(s_id, conn))
			.await??;

		info!("released slot {}", slot.number);

		Ok(slot)
	}

	/// Take an available slot out of service
	#[instrument(skip(conn))]
	pub async fn set_maintenance(
		s_id: i32,
		conn: &DbConn,
	) -> Result<Self, Error> {
		conn.interact(move |conn| transitions::mark_maintenance(s_id, conn))
			.await??;

		info!("slot {s_id} put under maintenance");

		Self::get_by_id(s_id, conn).await
	}

	/// Return a slot under maintenance to service
	#[instrument(skip(conn))]
	pub async fn clear_maintenance(
		s_id: i32,
		conn: &DbConn,
	) -> Result<Self, Error> {
		conn.interact(move |conn| transitions::clear_maintenance(s_id, conn))
			.await??;

		info!("slot {s_id} back in service");

		Self::get_by_id(s_id, conn).await
	}
}
