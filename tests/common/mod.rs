use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestResponse, TestServer};
use common::DbPool;
use db::{SlotStatus, SlotType, VehicleType};
use parkwise::notifier::{Notifier, StubOutbox};
use parkwise::schemas::booking::BookingResponse;
use parkwise::{AppState, Config, USER_ID_HEADER, USER_ROLE_HEADER, routes};
use primitive_slot::{NewSlot, PrimitiveSlot};
use primitive_vehicle::{NewVehicle, PrimitiveVehicle};
use rust_decimal::Decimal;

pub mod wrappers;

mod mock_db;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};

/// Id of the allocator every test acts as for staff routes
pub const ALLOCATOR_ID: i32 = 9000;

#[allow(dead_code)]
pub struct TestEnv {
	pub app:         TestServer,
	pub pool:        DbPool,
	pub db_guard:    DatabaseGuard,
	pub stub_outbox: Arc<StubOutbox>,
}

/// Attach caller headers to a test request
#[allow(dead_code)]
pub trait AsCaller: Sized {
	fn as_caller(self, user_id: i32, role: &'static str) -> Self;

	fn as_owner(self, user_id: i32) -> Self { self.as_caller(user_id, "owner") }

	fn as_allocator(self) -> Self { self.as_caller(ALLOCATOR_ID, "allocator") }
}

impl AsCaller for TestRequest {
	fn as_caller(self, user_id: i32, role: &'static str) -> Self {
		self.add_header(
			HeaderName::from_static(USER_ID_HEADER),
			HeaderValue::from(user_id),
		)
		.add_header(
			HeaderName::from_static(USER_ROLE_HEADER),
			HeaderValue::from_static(role),
		)
	}
}

#[allow(dead_code)]
impl TestEnv {
	/// Get a test environment with mocked resources for running tests
	///
	/// # Panics
	/// Panics if building a test server fails
	pub async fn new() -> Self {
		let config = Config {
			hourly_rate: Decimal::new(200, 2),
			event_sink: "stub".to_string(),
			..Config::from_env()
		};

		let db_guard = (*DATABASE_PROVIDER).acquire().await;
		let pool = db_guard.create_pool().await;

		let stub_outbox = config.create_stub_outbox();

		let notifier = Notifier::new(&config, stub_outbox.clone());

		let state =
			AppState { config, database_pool: pool.clone(), notifier };
		let app = routes::get_app_router(state);

		let test_server = TestServer::builder().build(app).unwrap();

		TestEnv {
			app: test_server,
			pool,
			db_guard,
			stub_outbox: stub_outbox.unwrap(),
		}
	}

	/// Add a slot, `number` is a row letter followed by a position
	pub async fn add_slot(&self, number: &str, slot_type: SlotType) -> PrimitiveSlot {
		let (row_label, position) = number.split_at(1);

		let new_slot = NewSlot {
			number: number.to_string(),
			row_label: row_label.to_string(),
			position: position.parse().unwrap(),
			slot_type,
			is_ev_charging_available: slot_type == SlotType::ElectricCar,
			is_special_slot: slot_type == SlotType::Disabled,
		};

		let conn = self.pool.get().await.unwrap();

		new_slot.insert(&conn).await.unwrap()
	}

	/// Register a vehicle for an owner
	pub async fn add_vehicle(
		&self,
		owner_id: i32,
		vehicle_type: VehicleType,
	) -> PrimitiveVehicle {
		let new_vehicle = NewVehicle {
			owner_id,
			plate_number: format!("1-TST-{owner_id:03}"),
			vehicle_type,
		};

		let conn = self.pool.get().await.unwrap();

		new_vehicle.insert(&conn).await.unwrap()
	}

	/// Read the current status of a slot straight from the database
	pub async fn slot_status(&self, slot_id: i32) -> SlotStatus {
		let conn = self.pool.get().await.unwrap();

		PrimitiveSlot::get_by_id(slot_id, &conn).await.unwrap().status
	}

	/// Move the check-in time of a booking `minutes` into the past
	pub async fn backdate_check_in(&self, booking_id: i32, minutes: i32) {
		let conn = self.pool.get().await.unwrap();

		conn.interact(move |conn| {
			use diesel::prelude::*;
			use diesel::sql_types::Integer;

			diesel::sql_query(
				"UPDATE booking SET actual_check_in_time = \
				 actual_check_in_time - make_interval(mins => $1) WHERE id = $2",
			)
			.bind::<Integer, _>(minutes)
			.bind::<Integer, _>(booking_id)
			.execute(conn)
		})
		.await
		.unwrap()
		.unwrap();
	}

	/// Request a booking for a vehicle as its owner
	pub async fn create_booking(
		&self,
		owner_id: i32,
		vehicle_id: i32,
	) -> BookingResponse {
		self.app
			.post("/bookings")
			.as_owner(owner_id)
			.json(&serde_json::json!({ "vehicleId": vehicle_id }))
			.await
			.json::<BookingResponse>()
	}

	/// Approve a booking as an allocator
	pub async fn approve(
		&self,
		booking_id: i32,
		slot_id: Option<i32>,
	) -> TestResponse {
		self.app
			.post(&format!("/bookings/{booking_id}/approve"))
			.as_allocator()
			.json(&serde_json::json!({ "slotId": slot_id }))
			.await
	}

	/// Check a booking in as an allocator
	pub async fn check_in(&self, booking_id: i32) -> TestResponse {
		self.app
			.post(&format!("/bookings/{booking_id}/check-in"))
			.as_allocator()
			.await
	}

	/// Pay for a booking as its owner
	pub async fn pay(&self, booking_id: i32, owner_id: i32) -> TestResponse {
		self.app
			.post(&format!("/bookings/{booking_id}/payment"))
			.as_owner(owner_id)
			.json(&serde_json::json!({ "paymentMethod": "card" }))
			.await
	}

	/// Walk a fresh booking up to `active_parking` on the given slot
	pub async fn parked_booking(
		&self,
		owner_id: i32,
		slot_id: i32,
	) -> BookingResponse {
		let vehicle = self.add_vehicle(owner_id, VehicleType::Car).await;
		let booking = self.create_booking(owner_id, vehicle.id).await;

		self.approve(booking.id, Some(slot_id)).await.assert_status_ok();

		let response = self.check_in(booking.id).await;
		response.assert_status_ok();

		response.json::<BookingResponse>()
	}
}
