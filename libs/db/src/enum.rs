use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking
///
/// ```text
/// pending_approval -> confirmed | rejected | cancelled_by_user | cancelled_by_admin
/// confirmed        -> active_parking | cancelled_by_user | cancelled_by_admin
/// active_parking   -> completed | paid
/// ```
#[derive(
	Clone,
	Copy,
	DbEnum,
	Debug,
	Default,
	Deserialize,
	PartialEq,
	Eq,
	Hash,
	Serialize,
)]
#[ExistingTypePath = "crate::sql_types::BookingStatus"]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
	#[default]
	PendingApproval,
	Confirmed,
	Rejected,
	CancelledByUser,
	CancelledByAdmin,
	ActiveParking,
	Completed,
	Paid,
}

impl BookingStatus {
	/// Statuses in which a booking holds its slot (reserved or occupied)
	pub const HOLDING_SLOT: [Self; 2] = [Self::Confirmed, Self::ActiveParking];

	/// Statuses from which the booking can still progress
	pub const OPEN: [Self; 3] =
		[Self::PendingApproval, Self::Confirmed, Self::ActiveParking];

	/// Check whether a direct transition from `self` to `next` exists
	#[must_use]
	pub fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(
				Self::PendingApproval,
				Self::Confirmed
					| Self::Rejected
					| Self::CancelledByUser
					| Self::CancelledByAdmin
			) | (
				Self::Confirmed,
				Self::ActiveParking
					| Self::CancelledByUser
					| Self::CancelledByAdmin
			) | (Self::ActiveParking, Self::Completed | Self::Paid)
		)
	}

	/// No transition leaves a terminal status
	#[must_use]
	pub fn is_terminal(self) -> bool { !Self::OPEN.contains(&self) }

	/// Whether the slot this booking references is reserved or occupied on
	/// its behalf
	#[must_use]
	pub fn holds_slot(self) -> bool { Self::HOLDING_SLOT.contains(&self) }

	/// Whether a booking in this status must reference a slot
	#[must_use]
	pub fn references_slot(self) -> bool {
		matches!(
			self,
			Self::Confirmed | Self::ActiveParking | Self::Completed | Self::Paid
		)
	}

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::PendingApproval => "pending_approval",
			Self::Confirmed => "confirmed",
			Self::Rejected => "rejected",
			Self::CancelledByUser => "cancelled_by_user",
			Self::CancelledByAdmin => "cancelled_by_admin",
			Self::ActiveParking => "active_parking",
			Self::Completed => "completed",
			Self::Paid => "paid",
		}
	}
}

impl std::fmt::Display for BookingStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::PaymentStatus"]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
	#[default]
	Unpaid,
	Paid,
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::SlotStatus"]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
	#[default]
	Available,
	Reserved,
	Occupied,
	Maintenance,
}

/// Compatibility class of a slot
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::SlotType"]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
	#[default]
	Car,
	ElectricCar,
	Motorcycle,
	Van,
	Disabled,
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::VehicleType"]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
	#[default]
	Car,
	ElectricCar,
	Motorcycle,
	Van,
}
