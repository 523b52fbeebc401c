#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{VehicleType, vehicle};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A vehicle as registered by the external vehicle registry
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = vehicle)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveVehicle {
	pub id:           i32,
	pub owner_id:     i32,
	pub plate_number: String,
	pub vehicle_type: VehicleType,
	pub created_at:   NaiveDateTime,
}

impl PrimitiveVehicle {
	/// Get a [`PrimitiveVehicle`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(v_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let vehicle = conn
			.interact(move |conn| Self::find(v_id, conn))
			.await??
			.ok_or_else(|| {
				Error::NotFound(format!("vehicle with id {v_id}"))
			})?;

		Ok(vehicle)
	}

	pub fn find(
		v_id: i32,
		conn: &mut PgConnection,
	) -> QueryResult<Option<Self>> {
		use self::vehicle::dsl::*;

		vehicle.find(v_id).select(Self::as_select()).get_result(conn).optional()
	}

	/// Get a vehicle and make sure it belongs to the given owner
	///
	/// # Errors
	/// Fails with [`Error::NotFound`] if the vehicle does not exist and with
	/// [`Error::Forbidden`] if it belongs to someone else
	#[instrument(skip(conn))]
	pub async fn get_owned(
		v_id: i32,
		owner: i32,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let vehicle = Self::get_by_id(v_id, conn).await?;

		if vehicle.owner_id != owner {
			warn!("user {owner} tried to use vehicle {v_id} they do not own");

			return Err(Error::Forbidden);
		}

		Ok(vehicle)
	}
}

/// A vehicle as added by the external vehicle registry
#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = vehicle)]
pub struct NewVehicle {
	pub owner_id:     i32,
	pub plate_number: String,
	pub vehicle_type: VehicleType,
}

impl NewVehicle {
	/// Insert this [`NewVehicle`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<PrimitiveVehicle, Error> {
		let vehicle = conn
			.interact(|conn| {
				use self::vehicle::dsl::*;

				diesel::insert_into(vehicle)
					.values(self)
					.returning(PrimitiveVehicle::as_returning())
					.get_result(conn)
			})
			.await??;

		debug!("registered vehicle {} for owner {}", vehicle.id, vehicle.owner_id);

		Ok(vehicle)
	}
}
