use booking::{Booking, FeeQuote, NewBooking};
use chrono::NaiveDateTime;
use db::{BookingStatus, PaymentStatus, VehicleType};
use primitive_vehicle::PrimitiveVehicle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

use crate::schemas::slot::SlotResponse;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
	pub id:                    i32,
	pub user_id:               i32,
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

	pub vehicle: VehicleResponse,
	pub slot:    Option<SlotResponse>,
}

impl From<Booking> for BookingResponse {
	fn from(value: Booking) -> Self {
		let booking = value.booking;

		Self {
			id:                    booking.id,
			user_id:               booking.user_id,
			status:                booking.status,
			requested_start_time:  booking.requested_start_time,
			requested_end_time:    booking.requested_end_time,
			actual_check_in_time:  booking.actual_check_in_time,
			actual_check_out_time: booking.actual_check_out_time,
			amount:                booking.amount,
			payment_status:        booking.payment_status,
			payment_method:        booking.payment_method,
			payment_date:          booking.payment_date,
			notes:                 booking.notes,
			admin_remarks:         booking.admin_remarks,
			created_at:            booking.created_at,
			updated_at:            booking.updated_at,
			vehicle:               value.vehicle.into(),
			slot:                  value.slot.map(Into::into),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
	pub id:           i32,
	pub owner_id:     i32,
	pub plate_number: String,
	pub vehicle_type: VehicleType,
}

impl From<PrimitiveVehicle> for VehicleResponse {
	fn from(value: PrimitiveVehicle) -> Self {
		Self {
			id:           value.id,
			owner_id:     value.owner_id,
			plate_number: value.plate_number,
			vehicle_type: value.vehicle_type,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreviewResponse {
	pub booking_id:   i32,
	pub check_in:     NaiveDateTime,
	pub check_out:    NaiveDateTime,
	pub billed_hours: i64,
	pub hourly_rate:  Decimal,
	pub amount:       Decimal,
}

impl From<(i32, FeeQuote)> for PaymentPreviewResponse {
	fn from((booking_id, quote): (i32, FeeQuote)) -> Self {
		Self {
			booking_id,
			check_in: quote.check_in,
			check_out: quote.check_out,
			billed_hours: quote.billed_hours,
			hourly_rate: quote.hourly_rate,
			amount: quote.amount,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
	pub vehicle_id: i32,
	#[validate(length(
		max = 500,
		message = "notes can be at most 500 characters long",
		code = "notes-length"
	))]
	pub notes:      Option<String>,
}

impl CreateBookingRequest {
	#[must_use]
	pub fn to_insertable(self, user_id: i32) -> NewBooking {
		let notes = self
			.notes
			.map(|n| n.trim().to_string())
			.filter(|n| !n.is_empty());

		NewBooking { user_id, vehicle_id: self.vehicle_id, notes }
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBookingRequest {
	/// Slot to bind, the first compatible one is picked when absent
	pub slot_id:       Option<i32>,
	#[validate(length(
		max = 500,
		message = "admin remarks can be at most 500 characters long",
		code = "admin-remarks-length"
	))]
	pub admin_remarks: Option<String>,
}

/// Body of the staff actions that require a reason
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemarksRequest {
	#[validate(length(
		min = 1,
		max = 500,
		message = "admin remarks must be between 1 and 500 characters long",
		code = "admin-remarks-length"
	))]
	pub admin_remarks: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayBookingRequest {
	#[validate(length(
		min = 1,
		max = 32,
		message = "payment method must be between 1 and 32 characters long",
		code = "payment-method-length"
	))]
	pub payment_method: String,
}
