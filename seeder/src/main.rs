mod util;

use std::env;

use clap::{Error, Parser};
use common::DbConn;
use db::{SlotType, VehicleType};
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::RunQueryDsl;
use fake::Fake;
use primitive_slot::NewSlot;
use primitive_vehicle::NewVehicle;
use rand::seq::IndexedRandom;
use rand::{Rng, rng};

use crate::util::{batch_insert, generate_unique_set, row_label};

const VEHICLE_TYPES: [VehicleType; 6] = [
	VehicleType::Car,
	VehicleType::Car,
	VehicleType::Car,
	VehicleType::ElectricCar,
	VehicleType::Motorcycle,
	VehicleType::Van,
];

#[derive(Parser, Debug)]
struct Opt {
	#[arg(long, short = 'r', default_value_t = 4)]
	rows:     usize,
	#[arg(long, short = 'p', default_value_t = 10)]
	per_row:  usize,
	#[arg(long, short = 'v', default_value_t = 50)]
	vehicles: usize,
	#[arg(long, short = 'o', default_value_t = 20)]
	owners:   i32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let cli = Opt::parse();
	let conn = get_conn().await;

	if cli.rows > 0 && cli.per_row > 0 {
		println!("Seeding {} rows of {} slots…", cli.rows, cli.per_row);
		let inserted = seed_slots(&conn, cli.rows, cli.per_row).await?;
		println!("Inserted {inserted} slots");
	}

	if cli.vehicles > 0 && cli.owners > 0 {
		println!("Seeding {} vehicles for {} owners…", cli.vehicles, cli.owners);
		let inserted = seed_vehicles(&conn, cli.vehicles, cli.owners).await?;
		println!("Inserted {inserted} vehicles");
	}

	Ok(())
}

/// Get a database connection from the pool
async fn get_conn() -> DbConn {
	let database_url = env::var("DATABASE_URL").expect("DATABASE_URL missing");

	let manager = Manager::new(database_url, deadpool_diesel::Runtime::Tokio1);
	let pool = Pool::builder(manager).build().expect("Failed to create pool");

	pool.get().await.expect("Failed to get a database connection")
}

/// Pick the type of a slot from its place in the grid
///
/// The first slot of every row is a special disabled slot and the last one
/// has a charger, the rest is mostly plain car slots.
fn slot_type_at(position: usize, per_row: usize) -> SlotType {
	match position {
		1 => SlotType::Disabled,
		p if p == per_row => SlotType::ElectricCar,
		p if p % 7 == 0 => SlotType::Van,
		p if p % 5 == 0 => SlotType::Motorcycle,
		_ => SlotType::Car,
	}
}

/// Seed a grid of slots, rows A.. with positions 1..=per_row
async fn seed_slots(
	conn: &DbConn,
	rows: usize,
	per_row: usize,
) -> Result<usize, Error> {
	let mut rng = rng();

	let slots: Vec<NewSlot> = (0..rows)
		.flat_map(|row| (1..=per_row).map(move |position| (row, position)))
		.map(|(row, position)| {
			let row_label = row_label(row);
			let slot_type = slot_type_at(position, per_row);
			let is_ev_charging_available = slot_type == SlotType::ElectricCar
				|| (slot_type == SlotType::Car && rng.random_bool(0.1));

			let number = format!("{row_label}{position:02}");
			#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
			let position = position as i32;

			NewSlot {
				number,
				row_label,
				position,
				slot_type,
				is_ev_charging_available,
				is_special_slot: slot_type == SlotType::Disabled,
			}
		})
		.collect();

	batch_insert(conn, slots, 2 << 10, |conn, chunk| {
		use db::slot::dsl::*;
		diesel::insert_into(slot).values(chunk).execute(conn)
	})
	.await
}

/// Seed vehicles with unique plates spread over `owners` owner ids
async fn seed_vehicles(
	conn: &DbConn,
	count: usize,
	owners: i32,
) -> Result<usize, Error> {
	let mut plate_rng = rng();

	let plates = generate_unique_set(count, || {
		let letters: String = (0..3)
			.map(|_| char::from(plate_rng.random_range(b'A'..=b'Z')))
			.collect();
		let digits = (100..1000).fake_with_rng::<u32, _>(&mut plate_rng);

		format!("1-{letters}-{digits}")
	});

	let mut rng = rng();

	let vehicles: Vec<NewVehicle> = plates
		.into_iter()
		.map(|plate_number| {
			let owner_id = (1..=owners).fake_with_rng(&mut rng);
			let vehicle_type =
				*VEHICLE_TYPES.choose(&mut rng).unwrap_or(&VehicleType::Car);

			NewVehicle { owner_id, plate_number, vehicle_type }
		})
		.collect();

	batch_insert(conn, vehicles, 2 << 10, |conn, chunk| {
		use db::vehicle::dsl::*;
		diesel::insert_into(vehicle).values(chunk).execute(conn)
	})
	.await
}
