//! Parking fee policy
//!
//! Every started hour is billed in full and a stay always bills at least one
//! hour, so `compute(t, t, rate) == rate`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Number of hours billed for a stay from `check_in` to `check_out`
///
/// A `check_out` before `check_in` counts as a zero length stay.
#[must_use]
pub fn billed_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> i64 {
	let elapsed = (check_out - check_in).num_milliseconds().max(0);
	let started = elapsed / MILLIS_PER_HOUR
		+ i64::from(elapsed % MILLIS_PER_HOUR != 0);

	started.max(1)
}

/// Fee for a stay from `check_in` to `check_out` at a flat hourly rate
#[must_use]
pub fn compute(
	check_in: NaiveDateTime,
	check_out: NaiveDateTime,
	hourly_rate: Decimal,
) -> Decimal {
	(Decimal::from(billed_hours(check_in, check_out)) * hourly_rate).round_dp(2)
}

/// A computed but not persisted fee
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
	pub check_in:     NaiveDateTime,
	pub check_out:    NaiveDateTime,
	pub billed_hours: i64,
	pub hourly_rate:  Decimal,
	pub amount:       Decimal,
}

impl FeeQuote {
	#[must_use]
	pub fn new(
		check_in: NaiveDateTime,
		check_out: NaiveDateTime,
		hourly_rate: Decimal,
	) -> Self {
		Self {
			check_in,
			check_out,
			billed_hours: billed_hours(check_in, check_out),
			hourly_rate,
			amount: compute(check_in, check_out, hourly_rate),
		}
	}
}
