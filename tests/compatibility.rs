use db::{SlotType, VehicleType};
use slot::is_compatible;

const SLOT_TYPES: [SlotType; 5] = [
	SlotType::Car,
	SlotType::ElectricCar,
	SlotType::Motorcycle,
	SlotType::Van,
	SlotType::Disabled,
];

const VEHICLE_TYPES: [VehicleType; 4] = [
	VehicleType::Car,
	VehicleType::ElectricCar,
	VehicleType::Motorcycle,
	VehicleType::Van,
];

#[test]
fn disabled_slots_take_every_vehicle_test() {
	for vehicle in VEHICLE_TYPES {
		assert!(is_compatible(SlotType::Disabled, vehicle), "{vehicle:?}");
	}
}

#[test]
fn electric_cars_may_use_car_slots_test() {
	assert!(is_compatible(SlotType::Car, VehicleType::ElectricCar));
	assert!(!is_compatible(SlotType::ElectricCar, VehicleType::Car));
}

#[test]
fn compatibility_table_test() {
	let allowed = [
		(SlotType::Car, VehicleType::Car),
		(SlotType::Car, VehicleType::ElectricCar),
		(SlotType::ElectricCar, VehicleType::ElectricCar),
		(SlotType::Motorcycle, VehicleType::Motorcycle),
		(SlotType::Van, VehicleType::Van),
	];

	for slot in SLOT_TYPES {
		for vehicle in VEHICLE_TYPES {
			let expected =
				slot == SlotType::Disabled || allowed.contains(&(slot, vehicle));

			assert_eq!(
				is_compatible(slot, vehicle),
				expected,
				"{slot:?} slot with {vehicle:?}"
			);
		}
	}
}
