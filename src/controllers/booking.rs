//! Controllers for [`Booking`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::{Booking, BookingFilter, Transition};
use common::{DbPool, Error};
use validator::Validate;

use crate::notifier::Notifier;
use crate::schemas::booking::{
	ApproveBookingRequest,
	BookingResponse,
	CreateBookingRequest,
	PayBookingRequest,
	PaymentPreviewResponse,
	RemarksRequest,
};
use crate::{Caller, Config, StaffCaller};

/// Emit the event of a committed transition and render the booking
fn respond(
	transition: Transition,
	notifier: &Notifier,
	status: StatusCode,
) -> (StatusCode, Json<BookingResponse>) {
	notifier.notify(transition.event);

	(status, Json(transition.booking.into()))
}

/// Request a parking slot for one of the caller's vehicles
#[instrument(skip(pool, notifier))]
pub(crate) async fn create_booking(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	caller: Caller,
	Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let new_booking = request.to_insertable(caller.user_id);
	let transition = new_booking.insert(config.window_policy(), &conn).await?;

	Ok(respond(transition, &notifier, StatusCode::CREATED))
}

#[instrument(skip(pool))]
pub(crate) async fn get_my_bookings(
	State(pool): State<DbPool>,
	caller: Caller,
	Query(filter): Query<BookingFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let bookings = Booking::for_user(caller.user_id, filter, &conn).await?;
	let response: Vec<BookingResponse> =
		bookings.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_pending_bookings(
	State(pool): State<DbPool>,
	_caller: StaffCaller,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let bookings = Booking::pending(&conn).await?;
	let response: Vec<BookingResponse> =
		bookings.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Get a single booking, owners only see their own
#[instrument(skip(pool))]
pub(crate) async fn get_booking(
	State(pool): State<DbPool>,
	caller: Caller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let booking = Booking::get_by_id(id, &conn).await?;

	if !caller.is_staff() {
		booking.booking.ensure_owned_by(caller.user_id)?;
	}

	let response: BookingResponse = booking.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn cancel_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	caller: Caller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let transition = Booking::cancel_by_user(id, caller.user_id, &conn).await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn approve_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
	Json(request): Json<ApproveBookingRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let transition =
		Booking::approve(id, request.slot_id, request.admin_remarks, &conn)
			.await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn reject_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
	Json(request): Json<RemarksRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let transition = Booking::reject(id, request.admin_remarks, &conn).await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn cancel_booking_as_admin(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
	Json(request): Json<RemarksRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let transition =
		Booking::cancel_by_admin(id, request.admin_remarks, &conn).await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn check_in_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let transition = Booking::check_in(id, &conn).await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn check_out_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let transition = Booking::check_out(id, &conn).await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}

/// Preview what paying would cost right now, nothing is stored
#[instrument(skip(pool))]
pub(crate) async fn get_payment_preview(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	caller: Caller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let quote =
		Booking::quote(id, caller.user_id, config.hourly_rate, &conn).await?;
	let response: PaymentPreviewResponse = (id, quote).into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool, notifier))]
pub(crate) async fn pay_booking(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	caller: Caller,
	Path(id): Path<i32>,
	Json(request): Json<PayBookingRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let transition = Booking::pay(
		id,
		caller.user_id,
		request.payment_method.trim().to_string(),
		config.hourly_rate,
		&conn,
	)
	.await?;

	Ok(respond(transition, &notifier, StatusCode::OK))
}
