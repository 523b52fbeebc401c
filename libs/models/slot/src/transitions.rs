//! Slot status changes that run on an already open connection
//!
//! These are meant to be called from inside a booking transaction so the
//! slot and booking rows commit or roll back together. Every change is a
//! single conditional `UPDATE`, never a read followed by a write.

use common::{Error, SlotUnavailableError};
use db::{SlotStatus, VehicleType, slot};
use diesel::prelude::*;
use primitive_slot::PrimitiveSlot;

use crate::is_compatible;

/// Move a slot from `from` to `to` if and only if it is currently `from`
fn compare_and_set(
	s_id: i32,
	from: SlotStatus,
	to: SlotStatus,
	conn: &mut PgConnection,
) -> QueryResult<Option<PrimitiveSlot>> {
	use self::slot::dsl::*;

	diesel::update(slot.find(s_id).filter(status.eq(from)))
		.set((status.eq(to), updated_at.eq(diesel::dsl::now)))
		.returning(PrimitiveSlot::as_returning())
		.get_result(conn)
		.optional()
}

/// Build the error for a conditional update that matched no row
fn missed(s_id: i32, conn: &mut PgConnection, err: Error) -> Error {
	match PrimitiveSlot::find(s_id, conn) {
		Ok(Some(_)) => err,
		Ok(None) => Error::NotFound(format!("slot with id {s_id}")),
		Err(e) => e.into(),
	}
}

/// Atomically move a slot from `available` to `reserved`
///
/// # Errors
/// Fails with [`SlotUnavailableError::NotAvailable`] if the slot is in any
/// other status and with [`Error::NotFound`] if it does not exist
pub fn mark_reserved(
	s_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	match compare_and_set(s_id, SlotStatus::Available, SlotStatus::Reserved, conn)? {
		Some(slot) => {
			debug!("slot {} ({}) reserved", slot.id, slot.number);

			Ok(slot)
		},
		None => {
			let err = SlotUnavailableError::NotAvailable { slot_id: s_id };

			Err(missed(s_id, conn, err.into()))
		},
	}
}

/// Move a reserved slot to `occupied`
///
/// # Errors
/// Fails with [`Error::Infallible`] if the slot is not reserved, which means
/// slot and booking status drifted apart
pub fn mark_occupied(
	s_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	match compare_and_set(s_id, SlotStatus::Reserved, SlotStatus::Occupied, conn)? {
		Some(slot) => {
			debug!("slot {} ({}) occupied", slot.id, slot.number);

			Ok(slot)
		},
		None => {
			let err = Error::Infallible(format!(
				"slot {s_id} was not reserved for the booking checking in"
			));

			Err(missed(s_id, conn, err))
		},
	}
}

/// Make a slot `available` again, whatever its current status
///
/// Releasing an already available slot changes nothing.
///
/// # Errors
/// Fails with [`Error::NotFound`] if the slot does not exist
pub fn mark_released(
	s_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	use self::slot::dsl::*;

	let released = diesel::update(slot.find(s_id))
		.set((status.eq(SlotStatus::Available), updated_at.eq(diesel::dsl::now)))
		.returning(PrimitiveSlot::as_returning())
		.get_result(conn)
		.optional()?
		.ok_or_else(|| Error::NotFound(format!("slot with id {s_id}")))?;

	debug!("slot {} ({}) released", released.id, released.number);

	Ok(released)
}

/// Available slots that can hold `vehicle`, in allocation order
pub fn compatible_candidates(
	vehicle: VehicleType,
	conn: &mut PgConnection,
) -> QueryResult<Vec<PrimitiveSlot>> {
	use self::slot::dsl::*;

	let candidates = slot
		.filter(status.eq(SlotStatus::Available))
		.order((row_label.asc(), position.asc(), id.asc()))
		.select(PrimitiveSlot::as_select())
		.load(conn)?
		.into_iter()
		.filter(|s| is_compatible(s.slot_type, vehicle))
		.collect();

	Ok(candidates)
}

/// Reserve a specific slot for a vehicle of the given type
///
/// # Errors
/// Fails with [`SlotUnavailableError::Incompatible`] if the slot cannot hold
/// the vehicle, otherwise see [`mark_reserved`]
pub fn reserve_compatible(
	s_id: i32,
	vehicle: VehicleType,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	let target = PrimitiveSlot::find(s_id, conn)?
		.ok_or_else(|| Error::NotFound(format!("slot with id {s_id}")))?;

	if !is_compatible(target.slot_type, vehicle) {
		return Err(SlotUnavailableError::Incompatible { slot_id: s_id }.into());
	}

	mark_reserved(s_id, conn)
}

/// Reserve the first available slot that can hold `vehicle`
///
/// Candidates that get taken by a concurrent approval between the read and
/// the reservation are skipped.
///
/// # Errors
/// Fails with [`SlotUnavailableError::NoCompatibleSlot`] if every candidate
/// is gone
pub fn reserve_first_compatible(
	vehicle: VehicleType,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	for candidate in compatible_candidates(vehicle, conn)? {
		let reserved = compare_and_set(
			candidate.id,
			SlotStatus::Available,
			SlotStatus::Reserved,
			conn,
		)?;

		if let Some(slot) = reserved {
			debug!("slot {} ({}) auto assigned", slot.id, slot.number);

			return Ok(slot);
		}
	}

	Err(SlotUnavailableError::NoCompatibleSlot.into())
}

/// Take an available slot out of service
///
/// # Errors
/// Fails with [`SlotUnavailableError::NotAvailable`] if the slot is held by
/// a booking or already under maintenance
pub fn mark_maintenance(
	s_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	match compare_and_set(
		s_id,
		SlotStatus::Available,
		SlotStatus::Maintenance,
		conn,
	)? {
		Some(slot) => Ok(slot),
		None => {
			let err = SlotUnavailableError::NotAvailable { slot_id: s_id };

			Err(missed(s_id, conn, err.into()))
		},
	}
}

/// Put a slot under maintenance back into service
///
/// # Errors
/// Fails with [`Error::InvalidState`] if the slot is not under maintenance
pub fn clear_maintenance(
	s_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveSlot, Error> {
	match compare_and_set(
		s_id,
		SlotStatus::Maintenance,
		SlotStatus::Available,
		conn,
	)? {
		Some(slot) => Ok(slot),
		None => {
			let err = Error::InvalidState(format!(
				"slot {s_id} is not under maintenance"
			));

			Err(missed(s_id, conn, err))
		},
	}
}
