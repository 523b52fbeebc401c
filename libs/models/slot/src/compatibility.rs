use db::{SlotType, VehicleType};

/// Whether a slot of type `slot` can hold a vehicle of type `vehicle`
///
/// This is the only place the rule lives, both explicit approvals and
/// automatic assignment go through it.
#[must_use]
pub fn is_compatible(slot: SlotType, vehicle: VehicleType) -> bool {
	match (slot, vehicle) {
		(SlotType::Disabled, _)
		| (SlotType::Car, VehicleType::Car | VehicleType::ElectricCar)
		| (SlotType::ElectricCar, VehicleType::ElectricCar)
		| (SlotType::Motorcycle, VehicleType::Motorcycle)
		| (SlotType::Van, VehicleType::Van) => true,
		_ => false,
	}
}
