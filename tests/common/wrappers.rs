use std::sync::Arc;
use std::time::Duration;

use booking::BookingEvent;
use parkwise::notifier::StubOutbox;

/// Wait until the outbox holds at least `count` events and return them
#[allow(dead_code)]
pub fn wait_for_events(outbox: &Arc<StubOutbox>, count: usize) -> Vec<BookingEvent> {
	let mut events = outbox.events.lock();

	while events.len() < count {
		let wait_res = outbox.signal.wait_for(&mut events, Duration::from_secs(2));

		assert!(
			!wait_res.timed_out() || events.len() >= count,
			"timed out waiting for {count} events, got {}",
			events.len(),
		);
	}

	events.clone()
}
