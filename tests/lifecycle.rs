use db::BookingStatus;

const ALL: [BookingStatus; 8] = [
	BookingStatus::PendingApproval,
	BookingStatus::Confirmed,
	BookingStatus::Rejected,
	BookingStatus::CancelledByUser,
	BookingStatus::CancelledByAdmin,
	BookingStatus::ActiveParking,
	BookingStatus::Completed,
	BookingStatus::Paid,
];

#[test]
fn terminal_statuses_have_no_successor_test() {
	for status in ALL.into_iter().filter(|s| s.is_terminal()) {
		for next in ALL {
			assert!(!status.can_transition_to(next), "{status} -> {next}");
		}
	}
}

#[test]
fn terminal_statuses_test() {
	let terminal =
		ALL.into_iter().filter(|s| s.is_terminal()).collect::<Vec<_>>();

	assert_eq!(terminal, vec![
		BookingStatus::Rejected,
		BookingStatus::CancelledByUser,
		BookingStatus::CancelledByAdmin,
		BookingStatus::Completed,
		BookingStatus::Paid,
	]);
}

#[test]
fn valid_transitions_test() {
	use BookingStatus::*;

	let valid = [
		(PendingApproval, Confirmed),
		(PendingApproval, Rejected),
		(PendingApproval, CancelledByUser),
		(PendingApproval, CancelledByAdmin),
		(Confirmed, ActiveParking),
		(Confirmed, CancelledByUser),
		(Confirmed, CancelledByAdmin),
		(ActiveParking, Completed),
		(ActiveParking, Paid),
	];

	for from in ALL {
		for to in ALL {
			assert_eq!(
				from.can_transition_to(to),
				valid.contains(&(from, to)),
				"{from} -> {to}"
			);
		}
	}
}

#[test]
fn no_status_moves_to_itself_or_back_to_pending_test() {
	for status in ALL {
		assert!(!status.can_transition_to(status));
		assert!(!status.can_transition_to(BookingStatus::PendingApproval));
	}
}

#[test]
fn every_path_reaches_a_terminal_status_test() {
	fn walk(status: BookingStatus, depth: usize) {
		assert!(depth <= 3, "path through {status} is too long");

		let next = ALL
			.into_iter()
			.filter(|n| status.can_transition_to(*n))
			.collect::<Vec<_>>();

		if next.is_empty() {
			assert!(status.is_terminal());
		}

		for n in next {
			walk(n, depth + 1);
		}
	}

	walk(BookingStatus::PendingApproval, 0);
}

#[test]
fn slot_holding_statuses_reference_a_slot_test() {
	for status in ALL {
		if status.holds_slot() {
			assert!(status.references_slot(), "{status}");
		}
	}

	assert!(BookingStatus::Completed.references_slot());
	assert!(!BookingStatus::Completed.holds_slot());
	assert!(!BookingStatus::CancelledByUser.references_slot());
}

#[test]
fn statuses_serialize_snake_case_test() {
	for status in ALL {
		let json = serde_json::to_string(&status).unwrap();

		assert_eq!(json, format!("\"{}\"", status.as_str()));
	}
}
