use async_trait::async_trait;
use log::{error, info};

use crate::domain::booking::Booking;
use crate::domain::catalog::CatalogIndex;
use crate::domain::errors::PipelineError;
use crate::domain::invoice::BookingInvoice;
use crate::domain::order::Order;
use crate::domain::platform::PaymentsPlatform;
use crate::domain::queue::{
	INVOICES_QUEUE_KEY, Message, MessageHandler, Queue, message_id_for,
};

#[derive(Clone)]
pub struct CreateOrderUseCase<P: PaymentsPlatform, Q: Queue<BookingInvoice>> {
	platform:       P,
	invoices_queue: Q,
}

impl<P: PaymentsPlatform, Q: Queue<BookingInvoice>> CreateOrderUseCase<P, Q> {
	pub fn new(platform: P, invoices_queue: Q) -> Self {
		Self {
			platform,
			invoices_queue,
		}
	}

	pub async fn execute(
		&self,
		message: Message<Booking>,
	) -> Result<BookingInvoice, PipelineError> {
		let idempotency_key = message.idempotency_key();
		let booking = message.body;

		let catalog = self.platform.list_catalog_items().await.map_err(|e| {
			error!("Failed to list catalog for booking {}: {e}", booking.id);
			PipelineError::platform(format!("booking {}", booking.id), e)
		})?;

		let lines = CatalogIndex::new(&catalog).resolve(&booking).inspect_err(|e| {
			error!("Failed to price booking {}: {e}", booking.id);
		})?;

		let order = Order::for_booking(&booking, &lines);
		let created = self
			.platform
			.create_order(&order, &idempotency_key)
			.await
			.map_err(|e| {
				error!("Failed to create order: {} - {e}", booking.id);
				PipelineError::platform(format!("booking {}", booking.id), e)
			})?;

		match created.total() {
			Some(total) => info!(
				"Created order {} for booking {} totalling {} {}",
				created.id.as_deref().unwrap_or("<unknown>"),
				booking.id,
				total.amount,
				total.currency
			),
			None => info!(
				"Created order {} for booking {}",
				created.id.as_deref().unwrap_or("<unknown>"),
				booking.id
			),
		}

		let booking_id = booking.id.clone();
		let item = BookingInvoice::new(booking, created)?;

		self.invoices_queue
			.push(Message::with(
				message_id_for(INVOICES_QUEUE_KEY, &booking_id),
				item.clone(),
			))
			.await
			.map_err(|e| {
				error!("Failed to queue order for booking {booking_id}: {e}");
				PipelineError::queue(e)
			})?;

		Ok(item)
	}
}

#[async_trait]
impl<P, Q> MessageHandler<Booking> for CreateOrderUseCase<P, Q>
where
	P: PaymentsPlatform,
	Q: Queue<BookingInvoice>,
{
	async fn handle(&self, message: Message<Booking>) -> Result<(), PipelineError> {
		self.execute(message).await.map(|_| ())
	}
}
