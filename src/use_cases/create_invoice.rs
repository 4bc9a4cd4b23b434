use async_trait::async_trait;
use log::{error, info};

use crate::domain::errors::{PipelineError, PlatformError};
use crate::domain::invoice::{BookingInvoice, DeliveryMethod, Invoice};
use crate::domain::platform::PaymentsPlatform;
use crate::domain::queue::{
	Message, MessageHandler, PUBLISH_QUEUE_KEY, Queue, message_id_for,
};
use crate::use_cases::dto::InvoiceOutcome;

#[derive(Clone)]
pub struct CreateInvoiceUseCase<P: PaymentsPlatform, Q: Queue<Invoice>> {
	platform:      P,
	publish_queue: Q,
}

impl<P: PaymentsPlatform, Q: Queue<Invoice>> CreateInvoiceUseCase<P, Q> {
	pub fn new(platform: P, publish_queue: Q) -> Self {
		Self {
			platform,
			publish_queue,
		}
	}

	/// Email when the customer has an email address on file, otherwise the
	/// seller shares the invoice by hand.
	pub async fn resolve_delivery_method(
		&self,
		customer_id: &str,
	) -> Result<DeliveryMethod, PlatformError> {
		let customer = self.platform.retrieve_customer(customer_id).await?;
		Ok(customer.delivery_method())
	}

	pub async fn execute(
		&self,
		message: Message<BookingInvoice>,
	) -> Result<InvoiceOutcome, PipelineError> {
		let idempotency_key = message.idempotency_key();
		let item = message.body;
		let booking_id = item.booking.id.clone();

		let delivery_method = self
			.resolve_delivery_method(&item.booking.customer_id)
			.await
			.map_err(|e| {
				error!(
					"Failed to retrieve customer {} for booking {booking_id}: {e}",
					item.booking.customer_id
				);
				PipelineError::platform(format!("booking {booking_id}"), e)
			})?;

		let draft = Invoice::draft_for(&item, delivery_method)?;
		let created = self
			.platform
			.create_invoice(&draft, &idempotency_key)
			.await
			.map_err(|e| {
				error!("Failed to create invoice: {booking_id} - {e}");
				PipelineError::platform(format!("booking {booking_id}"), e)
			})?;

		let invoice_id = created.id.clone().ok_or_else(|| {
			error!("Created invoice for booking {booking_id} has no id");
			PipelineError::platform(
				format!("booking {booking_id}"),
				PlatformError::InvalidResponse {
					detail: "created invoice has no id".to_string(),
				},
			)
		})?;

		info!("Created invoice {invoice_id} for booking {booking_id}");

		match created.delivery_method {
			DeliveryMethod::Email => {
				self.publish_queue
					.push(Message::with(
						message_id_for(PUBLISH_QUEUE_KEY, &invoice_id),
						created.clone(),
					))
					.await
					.map_err(|e| {
						error!("Failed to queue invoice {invoice_id} for publishing: {e}");
						PipelineError::queue(e)
					})?;
				Ok(InvoiceOutcome::QueuedForPublish(created))
			}
			DeliveryMethod::ShareManually => {
				info!(
					"Invoice {invoice_id} for booking {booking_id} awaits manual \
					 sharing"
				);
				Ok(InvoiceOutcome::AwaitingManualShare(created))
			}
		}
	}
}

#[async_trait]
impl<P, Q> MessageHandler<BookingInvoice> for CreateInvoiceUseCase<P, Q>
where
	P: PaymentsPlatform,
	Q: Queue<Invoice>,
{
	async fn handle(
		&self,
		message: Message<BookingInvoice>,
	) -> Result<(), PipelineError> {
		self.execute(message).await.map(|_| ())
	}
}
