use async_trait::async_trait;
use log::{error, info};

use crate::domain::errors::{PipelineError, PlatformError};
use crate::domain::invoice::{Invoice, PublishRequest};
use crate::domain::platform::PaymentsPlatform;
use crate::domain::queue::{Message, MessageHandler};

#[derive(Clone)]
pub struct PublishInvoiceUseCase<P: PaymentsPlatform> {
	platform: P,
}

impl<P: PaymentsPlatform> PublishInvoiceUseCase<P> {
	pub fn new(platform: P) -> Self {
		Self { platform }
	}

	/// Publishes exactly the version carried by the message. A stale version
	/// is reported as [`PipelineError::VersionConflict`] and never bumped.
	pub async fn execute(
		&self,
		message: Message<Invoice>,
	) -> Result<Invoice, PipelineError> {
		let idempotency_key = message.idempotency_key();
		let request = PublishRequest::for_invoice(&message.body).ok_or_else(|| {
			error!(
				"Invoice {} cannot be published without id and version",
				message.body.id.as_deref().unwrap_or("<unknown>")
			);
			PipelineError::UnpublishableInvoice {
				reason: "invoice has no id or version".to_string(),
			}
		})?;

		let published = self
			.platform
			.publish_invoice(&request.invoice_id, request.version, &idempotency_key)
			.await
			.map_err(|e| match e {
				PlatformError::VersionConflict { .. } => {
					error!(
						"Failed to publish invoice: {} - version {} is stale: {e}",
						request.invoice_id, request.version
					);
					PipelineError::VersionConflict {
						invoice_id: request.invoice_id.clone(),
						version:    request.version,
					}
				}
				e => {
					error!("Failed to publish invoice: {} - {e}", request.invoice_id);
					PipelineError::platform(
						format!("invoice {}", request.invoice_id),
						e,
					)
				}
			})?;

		info!(
			"Published invoice {}",
			published.id.as_deref().unwrap_or(&request.invoice_id)
		);

		Ok(published)
	}
}

#[async_trait]
impl<P: PaymentsPlatform> MessageHandler<Invoice> for PublishInvoiceUseCase<P> {
	async fn handle(&self, message: Message<Invoice>) -> Result<(), PipelineError> {
		self.execute(message).await.map(|_| ())
	}
}
