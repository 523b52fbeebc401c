use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::booking::{
	approve_booking,
	cancel_booking,
	cancel_booking_as_admin,
	check_in_booking,
	check_out_booking,
	create_booking,
	get_booking,
	get_my_bookings,
	get_payment_preview,
	get_pending_bookings,
	pay_booking,
	reject_booking,
};
use crate::controllers::healthcheck;
use crate::controllers::slot::{
	clear_slot_maintenance,
	get_compatible_slot,
	get_slot,
	get_slots,
	set_slot_maintenance,
};

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/bookings", booking_routes())
		.nest("/slots", slot_routes());

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(10)))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Booking routes, callers are checked by the extractors of each handler
fn booking_routes() -> Router<AppState> {
	Router::new()
		.route("/", post(create_booking))
		.route("/mine", get(get_my_bookings))
		.route("/pending", get(get_pending_bookings))
		.route("/{id}", get(get_booking))
		.route("/{id}/cancel", post(cancel_booking))
		.route("/{id}/approve", post(approve_booking))
		.route("/{id}/reject", post(reject_booking))
		.route("/{id}/admin-cancel", post(cancel_booking_as_admin))
		.route("/{id}/check-in", post(check_in_booking))
		.route("/{id}/check-out", post(check_out_booking))
		.route("/{id}/payment", get(get_payment_preview).post(pay_booking))
}

/// Slot routes, staff only
fn slot_routes() -> Router<AppState> {
	Router::new()
		.route("/", get(get_slots))
		.route("/compatible", get(get_compatible_slot))
		.route("/{id}", get(get_slot))
		.route(
			"/{id}/maintenance",
			post(set_slot_maintenance).delete(clear_slot_maintenance),
		)
}
