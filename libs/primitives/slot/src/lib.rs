#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{SlotStatus, SlotType, slot};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = slot)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveSlot {
	pub id:                       i32,
	pub number:                   String,
	pub row_label:                String,
	pub position:                 i32,
	pub slot_type:                SlotType,
	pub is_ev_charging_available: bool,
	pub is_special_slot:          bool,
	pub status:                   SlotStatus,
	pub created_at:               NaiveDateTime,
	pub updated_at:               NaiveDateTime,
}

impl PrimitiveSlot {
	/// Get a [`PrimitiveSlot`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(s_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let slot = conn
			.interact(move |conn| Self::find(s_id, conn))
			.await??
			.ok_or_else(|| Error::NotFound(format!("slot with id {s_id}")))?;

		Ok(slot)
	}

	/// Look up a slot on an open connection, usually inside a transaction
	pub fn find(
		s_id: i32,
		conn: &mut PgConnection,
	) -> QueryResult<Option<Self>> {
		use self::slot::dsl::*;

		slot.find(s_id).select(Self::as_select()).get_result(conn).optional()
	}
}

/// A slot as added by inventory management
#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = slot)]
pub struct NewSlot {
	pub number:                   String,
	pub row_label:                String,
	pub position:                 i32,
	pub slot_type:                SlotType,
	pub is_ev_charging_available: bool,
	pub is_special_slot:          bool,
}

impl NewSlot {
	/// Insert this [`NewSlot`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<PrimitiveSlot, Error> {
		let slot = conn
			.interact(|conn| {
				use self::slot::dsl::*;

				diesel::insert_into(slot)
					.values(self)
					.returning(PrimitiveSlot::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("added slot {} ({})", slot.id, slot.number);

		Ok(slot)
	}
}
