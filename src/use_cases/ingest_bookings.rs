use log::{error, info};

use crate::domain::booking::Booking;
use crate::domain::errors::PipelineError;
use crate::domain::platform::PaymentsPlatform;
use crate::domain::queue::{Message, ORDERS_QUEUE_KEY, Queue, message_id_for};
use crate::domain::schedule::{BookingWindow, format_utc};
use crate::use_cases::dto::IngestionReport;

#[derive(Clone)]
pub struct IngestBookingsUseCase<P: PaymentsPlatform, Q: Queue<Booking>> {
	platform:     P,
	orders_queue: Q,
}

impl<P: PaymentsPlatform, Q: Queue<Booking>> IngestBookingsUseCase<P, Q> {
	pub fn new(platform: P, orders_queue: Q) -> Self {
		Self {
			platform,
			orders_queue,
		}
	}

	pub async fn execute(
		&self,
		window: BookingWindow,
	) -> Result<IngestionReport, PipelineError> {
		let bookings = self
			.platform
			.list_bookings(window.start(), window.end())
			.await
			.map_err(|e| {
				error!(
					"Error getting appointments between {} and {}: {e}",
					format_utc(window.start()),
					format_utc(window.end())
				);
				PipelineError::platform("booking listing", e)
			})?;

		info!("Found {} appointments", bookings.len());

		let listed = bookings.len();
		let mut queued = 0;
		for booking in bookings {
			if !booking.status.is_billable() {
				continue;
			}

			let booking_id = booking.id.clone();
			self.orders_queue
				.push(Message::with(
					message_id_for(ORDERS_QUEUE_KEY, &booking_id),
					booking,
				))
				.await
				.map_err(|e| {
					error!("Failed to queue booking {booking_id}: {e}");
					PipelineError::queue(e)
				})?;
			queued += 1;
		}

		info!("Queued {queued} of {listed} appointments for invoicing");

		Ok(IngestionReport { listed, queued })
	}
}
