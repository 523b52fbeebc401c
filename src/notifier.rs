use std::sync::Arc;

use booking::BookingEvent;
use parking_lot::{Condvar, Mutex};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::Config;

/// Hands booking transition events to a background sink
#[derive(Clone, Debug)]
pub struct Notifier {
	send_queue: mpsc::Sender<BookingEvent>,
}

/// A fake outbox to keep track of events emitted in tests
#[derive(Default)]
pub struct StubOutbox {
	pub events: Mutex<Vec<BookingEvent>>,
	pub signal: Condvar,
}

impl Notifier {
	/// Create a new notifier and spawn its sink
	///
	/// # Panics
	/// Panics if a stub sink is expected but no outbox was provided
	#[must_use]
	pub fn new(config: &Config, stub_outbox: Option<Arc<StubOutbox>>) -> Self {
		let (tx, rx) = mpsc::channel(config.event_queue_size);

		if config.event_sink == "stub" {
			let Some(outbox) = stub_outbox else {
				panic!("MISSING STUB OUTBOX");
			};

			tokio::spawn(Self::start_stub_sink(rx, outbox));
		} else {
			tokio::spawn(Self::start_log_sink(rx));
		}

		Self { send_queue: tx }
	}

	/// Queue an event without waiting
	///
	/// The transition it describes is already committed, so a full or closed
	/// queue drops the event.
	pub fn notify(&self, event: BookingEvent) {
		match self.send_queue.try_send(event) {
			Ok(()) => (),
			Err(TrySendError::Full(event)) => {
				warn!(
					"event queue full, dropped event for booking {}",
					event.booking_id
				);
			},
			Err(TrySendError::Closed(event)) => {
				warn!(
					"event queue closed, dropped event for booking {}",
					event.booking_id
				);
			},
		}
	}

	/// Start an infinitely looping stub sink
	#[instrument(skip_all)]
	async fn start_stub_sink(
		mut rx: mpsc::Receiver<BookingEvent>,
		outbox: Arc<StubOutbox>,
	) -> impl Send + 'static {
		while let Some(event) = rx.recv().await {
			debug!(target: "[STUB_SINK]", "received {event:?}");

			let mut events = outbox.events.lock();
			events.push(event);
			outbox.signal.notify_all();
		}
	}

	/// Start an infinitely looping sink writing events to the log
	#[instrument(skip_all)]
	async fn start_log_sink(
		mut rx: mpsc::Receiver<BookingEvent>,
	) -> impl Send + 'static {
		while let Some(event) = rx.recv().await {
			info!(
				booking_id = event.booking_id,
				user_id = event.user_id,
				slot_id = event.slot_id,
				from = event.from.map(|s| s.as_str()),
				to = event.to.as_str(),
				at = %event.at,
				"booking transition",
			);
		}
	}
}
