use std::collections::HashSet;

use clap::Error;
use clap::error::ErrorKind;
use common::DbConn;
use diesel::PgConnection;

/// Generate `count` distinct values using a closure
pub fn generate_unique_set<F>(count: usize, mut f: F) -> Vec<String>
where
	F: FnMut() -> String,
{
	let mut set = HashSet::with_capacity(count);

	while set.len() < count {
		set.insert(f());
	}

	set.into_iter().collect()
}

/// Generic batch insertion function using closure-based approach
pub async fn batch_insert<T, F>(
	conn: &DbConn,
	mut items: Vec<T>,
	chunk_size: usize,
	inserter: F,
) -> Result<usize, Error>
where
	T: Send + 'static,
	F: Fn(&mut PgConnection, &[T]) -> Result<usize, diesel::result::Error>
		+ Send
		+ Copy
		+ 'static,
{
	let size = items.len();
	let mut total = 0;

	while !items.is_empty() {
		let chunk =
			items.drain(..chunk_size.min(items.len())).collect::<Vec<_>>();
		let chunk_len = chunk.len();

		let insert_len = conn
			.interact(move |c| inserter(c, &chunk))
			.await
			.map_err(|e| Error::raw(ErrorKind::Io, e))?
			.map_err(|e| Error::raw(ErrorKind::Io, e))?;

		total += insert_len;

		println!("Inserted {total}/{size} items");

		if insert_len != chunk_len {
			return Err(Error::raw(
				ErrorKind::Io,
				format!("Inserted {insert_len} items but expected {chunk_len}"),
			));
		}
	}

	Ok(total)
}

/// Spreadsheet style label for a zero based row index (A, B, ..., Z, AA, ...)
pub fn row_label(mut index: usize) -> String {
	let mut label = Vec::new();

	loop {
		#[allow(clippy::cast_possible_truncation)]
		label.push(b'A' + (index % 26) as u8);

		if index < 26 {
			break;
		}

		index = index / 26 - 1;
	}

	label.reverse();

	String::from_utf8_lossy(&label).into_owned()
}

#[cfg(test)]
mod tests {
	use super::row_label;

	#[test]
	fn row_labels_roll_over_after_z() {
		assert_eq!(row_label(0), "A");
		assert_eq!(row_label(25), "Z");
		assert_eq!(row_label(26), "AA");
		assert_eq!(row_label(27), "AB");
		assert_eq!(row_label(701), "ZZ");
		assert_eq!(row_label(702), "AAA");
	}
}
