//! Controllers for [`Slot`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use slot::{Slot, SlotFilter};

use crate::StaffCaller;
use crate::schemas::slot::{CompatibleSlotQuery, SlotResponse};

#[instrument(skip(pool))]
pub(crate) async fn get_slots(
	State(pool): State<DbPool>,
	_caller: StaffCaller,
	Query(filter): Query<SlotFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let slots = Slot::get_all(filter, &conn).await?;
	let response: Vec<SlotResponse> =
		slots.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn get_slot(
	State(pool): State<DbPool>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let slot = Slot::get_by_id(id, &conn).await?;
	let response: SlotResponse = slot.into();

	Ok((StatusCode::OK, Json(response)))
}

/// Show the slot automatic assignment would currently pick, if any
#[instrument(skip(pool))]
pub(crate) async fn get_compatible_slot(
	State(pool): State<DbPool>,
	_caller: StaffCaller,
	Query(query): Query<CompatibleSlotQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let slot = Slot::find_compatible(query.vehicle_type, &conn).await?;
	let response: Option<SlotResponse> = slot.map(Into::into);

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn set_slot_maintenance(
	State(pool): State<DbPool>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let slot = Slot::set_maintenance(id, &conn).await?;
	let response: SlotResponse = slot.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub(crate) async fn clear_slot_maintenance(
	State(pool): State<DbPool>,
	_caller: StaffCaller,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let slot = Slot::clear_maintenance(id, &conn).await?;
	let response: SlotResponse = slot.into();

	Ok((StatusCode::OK, Json(response)))
}
