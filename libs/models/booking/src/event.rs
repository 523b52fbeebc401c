use chrono::NaiveDateTime;
use db::BookingStatus;
use primitive_booking::PrimitiveBooking;
use serde::{Deserialize, Serialize};

/// Emitted once for every committed booking transition
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEvent {
	pub booking_id: i32,
	pub user_id:    i32,
	pub slot_id:    Option<i32>,
	/// `None` when the booking was just created
	pub from:       Option<BookingStatus>,
	pub to:         BookingStatus,
	pub at:         NaiveDateTime,
}

impl BookingEvent {
	#[must_use]
	pub fn created(booking: &PrimitiveBooking) -> Self {
		Self {
			booking_id: booking.id,
			user_id:    booking.user_id,
			slot_id:    booking.slot_id,
			from:       None,
			to:         booking.status,
			at:         booking.created_at,
		}
	}

	/// Describe the move from `before` to `after`, keeping the slot that was
	/// released when the booking no longer references one
	#[must_use]
	pub fn transitioned(
		before: &PrimitiveBooking,
		after: &PrimitiveBooking,
	) -> Self {
		Self {
			booking_id: after.id,
			user_id:    after.user_id,
			slot_id:    after.slot_id.or(before.slot_id),
			from:       Some(before.status),
			to:         after.status,
			at:         after.updated_at,
		}
	}
}
