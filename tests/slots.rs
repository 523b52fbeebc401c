mod common;

use axum::http::StatusCode;
use common::{AsCaller, TestEnv};
use ::common::{Error, SlotUnavailableError};
use db::{BookingStatus, SlotStatus, SlotType, VehicleType};
use parkwise::schemas::slot::SlotResponse;
use serde_json::Value;
use slot::Slot;

#[tokio::test(flavor = "multi_thread")]
async fn list_slots_in_allocation_order_test() {
	let env = TestEnv::new().await;
	env.add_slot("B1", SlotType::Car).await;
	env.add_slot("A2", SlotType::Van).await;
	env.add_slot("A1", SlotType::Disabled).await;

	let response = env.app.get("/slots").as_allocator().await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let slots = response.json::<Vec<SlotResponse>>();
	let numbers = slots.iter().map(|s| s.number.as_str()).collect::<Vec<_>>();

	assert_eq!(numbers, vec!["A1", "A2", "B1"]);
	assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
	assert!(slots[0].is_special_slot);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_slots_with_filter_test() {
	let env = TestEnv::new().await;
	let reserved = env.add_slot("A1", SlotType::Car).await;
	env.add_slot("A2", SlotType::Car).await;
	env.add_slot("A3", SlotType::Van).await;

	let vehicle = env.add_vehicle(1, VehicleType::Car).await;
	let booking = env.create_booking(1, vehicle.id).await;
	env.approve(booking.id, Some(reserved.id)).await.assert_status_ok();

	let slots = env
		.app
		.get("/slots?status=reserved")
		.as_allocator()
		.await
		.json::<Vec<SlotResponse>>();

	assert_eq!(slots.len(), 1);
	assert_eq!(slots[0].id, reserved.id);

	let occupant = slots[0].occupant.clone().flatten().unwrap();
	assert_eq!(occupant.booking_id, booking.id);
	assert_eq!(occupant.status, BookingStatus::Confirmed);

	let slots = env
		.app
		.get("/slots?status=available&slotType=car")
		.as_allocator()
		.await
		.json::<Vec<SlotResponse>>();

	assert_eq!(slots.len(), 1);
	assert_eq!(slots[0].number, "A2");
	assert!(slots[0].occupant.clone().flatten().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn slots_are_staff_only_test() {
	let env = TestEnv::new().await;
	let slot = env.add_slot("A1", SlotType::Car).await;

	let response = env.app.get("/slots").as_owner(1).await;
	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.app
		.post(&format!("/slots/{}/maintenance", slot.id))
		.as_owner(1)
		.await;
	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env.app.get("/slots").await;
	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

	let response = env.app.get("/slots").as_caller(1, "superuser").await;
	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn get_slot_test() {
	let env = TestEnv::new().await;
	let slot = env.add_slot("A1", SlotType::ElectricCar).await;

	let response = env
		.app
		.get(&format!("/slots/{}", slot.id))
		.as_allocator()
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<Value>();
	assert_eq!(body["number"], "A1");
	assert_eq!(body["slotType"], "electric_car");
	assert_eq!(body["isEvChargingAvailable"], true);
	assert!(body["occupant"].is_null());

	let response = env.app.get("/slots/4242").as_allocator().await;
	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn find_compatible_slot_is_deterministic_test() {
	let env = TestEnv::new().await;
	env.add_slot("A1", SlotType::Motorcycle).await;
	env.add_slot("B2", SlotType::Car).await;
	let expected = env.add_slot("B1", SlotType::Car).await;

	for _ in 0..3 {
		let slot = env
			.app
			.get("/slots/compatible?vehicleType=electric_car")
			.as_allocator()
			.await
			.json::<Option<SlotResponse>>()
			.unwrap();

		assert_eq!(slot.id, expected.id);
	}

	assert_eq!(env.slot_status(expected.id).await, SlotStatus::Available);

	let slot = env
		.app
		.get("/slots/compatible?vehicleType=van")
		.as_allocator()
		.await
		.json::<Option<SlotResponse>>();

	assert!(slot.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_slot_takes_any_vehicle_test() {
	let env = TestEnv::new().await;
	let slot = env.add_slot("A1", SlotType::Disabled).await;
	let vehicle = env.add_vehicle(1, VehicleType::Van).await;
	let booking = env.create_booking(1, vehicle.id).await;

	let response = env.approve(booking.id, None).await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(env.slot_status(slot.id).await, SlotStatus::Reserved);
}

#[tokio::test(flavor = "multi_thread")]
async fn maintenance_test() {
	let env = TestEnv::new().await;
	let slot = env.add_slot("A1", SlotType::Car).await;
	let path = format!("/slots/{}/maintenance", slot.id);

	let response = env.app.post(&path).as_allocator().await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<SlotResponse>().status, SlotStatus::Maintenance);

	// Slots under maintenance are never handed out
	let vehicle = env.add_vehicle(1, VehicleType::Car).await;
	let booking = env.create_booking(1, vehicle.id).await;

	let response = env.approve(booking.id, Some(slot.id)).await;
	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let response = env.approve(booking.id, None).await;
	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let response = env.app.post(&path).as_allocator().await;
	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let response = env.app.delete(&path).as_allocator().await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<SlotResponse>().status, SlotStatus::Available);

	let response = env.app.delete(&path).as_allocator().await;
	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	env.approve(booking.id, None).await.assert_status_ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn maintenance_on_held_slot_test() {
	let env = TestEnv::new().await;
	let slot = env.add_slot("A1", SlotType::Car).await;
	env.parked_booking(1, slot.id).await;

	let response = env
		.app
		.post(&format!("/slots/{}/maintenance", slot.id))
		.as_allocator()
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert_eq!(response.json::<Value>()["code"], 9);
	assert_eq!(env.slot_status(slot.id).await, SlotStatus::Occupied);
}

#[tokio::test(flavor = "multi_thread")]
async fn healthcheck_test() {
	let env = TestEnv::new().await;

	let response = env.app.get("/healthcheck").await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn reserve_and_release_test() {
	let env = TestEnv::new().await;
	let slot = env.add_slot("A1", SlotType::Car).await;
	let conn = env.pool.get().await.unwrap();

	let reserved = Slot::reserve(slot.id, &conn).await.unwrap();
	assert_eq!(reserved.status, SlotStatus::Reserved);

	// A second reserve must not silently succeed
	let err = Slot::reserve(slot.id, &conn).await.unwrap_err();
	assert!(matches!(
		err,
		Error::SlotUnavailable(SlotUnavailableError::NotAvailable { slot_id })
			if slot_id == slot.id
	));

	let released = Slot::release(slot.id, &conn).await.unwrap();
	assert_eq!(released.status, SlotStatus::Available);

	let released = Slot::release(slot.id, &conn).await.unwrap();
	assert_eq!(released.status, SlotStatus::Available);

	let err = Slot::release(4242, &conn).await.unwrap_err();
	assert!(matches!(err, Error::NotFound(_)));
}
