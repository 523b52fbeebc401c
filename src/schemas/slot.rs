use chrono::NaiveDateTime;
use db::{BookingStatus, SlotStatus, SlotType, VehicleType};
use primitive_booking::PrimitiveBooking;
use primitive_slot::PrimitiveSlot;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use slot::Slot;

use crate::schemas::ser_includes;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
	pub id:                       i32,
	pub number:                   String,
	pub row_label:                String,
	pub position:                 i32,
	pub slot_type:                SlotType,
	pub is_ev_charging_available: bool,
	pub is_special_slot:          bool,
	pub status:                   SlotStatus,
	pub created_at:               NaiveDateTime,
	pub updated_at:               NaiveDateTime,
	#[serde(default, serialize_with = "ser_includes")]
	pub occupant:                 Option<Option<OccupantResponse>>,
}

/// The booking currently holding a slot
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantResponse {
	pub booking_id: i32,
	pub user_id:    i32,
	pub vehicle_id: i32,
	pub status:     BookingStatus,
}

impl From<PrimitiveBooking> for OccupantResponse {
	fn from(value: PrimitiveBooking) -> Self {
		Self {
			booking_id: value.id,
			user_id:    value.user_id,
			vehicle_id: value.vehicle_id,
			status:     value.status,
		}
	}
}

impl From<PrimitiveSlot> for SlotResponse {
	fn from(value: PrimitiveSlot) -> Self {
		Self {
			id:                       value.id,
			number:                   value.number,
			row_label:                value.row_label,
			position:                 value.position,
			slot_type:                value.slot_type,
			is_ev_charging_available: value.is_ev_charging_available,
			is_special_slot:          value.is_special_slot,
			status:                   value.status,
			created_at:               value.created_at,
			updated_at:               value.updated_at,
			occupant:                 None,
		}
	}
}

impl From<Slot> for SlotResponse {
	fn from(value: Slot) -> Self {
		let occupant = value.occupant.map(Into::into);

		Self { occupant: Some(occupant), ..value.slot.into() }
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibleSlotQuery {
	pub vehicle_type: VehicleType,
}
