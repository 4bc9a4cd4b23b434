use derive_more::derive::{Display, Error};

/// Failure reported by the payments platform.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
	#[display("transport failure: {detail}")]
	Transport { detail: String },
	#[display("request declined with status {status} ({code}): {detail}")]
	Declined {
		status: u16,
		code:   String,
		detail: String,
	},
	#[display("version conflict: {detail}")]
	VersionConflict { detail: String },
	#[display("unexpected response: {detail}")]
	InvalidResponse { detail: String },
	#[display("credentials unavailable: {detail}")]
	Credentials { detail: String },
}

#[derive(Debug, Display, Error)]
pub enum PipelineError {
	#[display("platform call failed for {context}: {source}")]
	Platform {
		context: String,
		source:  PlatformError,
	},
	#[display(
		"booking {booking_id} references variation {service_variation_id} \
		 which has no priced catalog entry"
	)]
	MissingCatalogMapping {
		booking_id:           String,
		service_variation_id: String,
	},
	#[display("invoice {invoice_id} version {version} is stale")]
	VersionConflict { invoice_id: String, version: i32 },
	#[display("invoice cannot be published: {reason}")]
	UnpublishableInvoice { reason: String },
	#[display("order for booking {booking_id} is invalid: {reason}")]
	InvalidOrder { booking_id: String, reason: String },
	#[display("booking window is empty or inverted: {start} .. {end}")]
	InvalidWindow { start: String, end: String },
	#[display("queue operation failed: {detail}")]
	Queue { detail: String },
}

impl PipelineError {
	pub fn platform(context: impl Into<String>, source: PlatformError) -> Self {
		PipelineError::Platform {
			context: context.into(),
			source,
		}
	}

	pub fn queue(err: Box<dyn std::error::Error + Send>) -> Self {
		PipelineError::Queue {
			detail: err.to_string(),
		}
	}

	/// Whether redelivering the same message can succeed. Data problems and
	/// stale versions are never retried.
	pub fn is_retryable(&self) -> bool {
		match self {
			PipelineError::Platform { source, .. } => {
				!matches!(source, PlatformError::VersionConflict { .. })
			}
			PipelineError::Queue { .. } => true,
			PipelineError::MissingCatalogMapping { .. } |
			PipelineError::VersionConflict { .. } |
			PipelineError::UnpublishableInvoice { .. } |
			PipelineError::InvalidOrder { .. } |
			PipelineError::InvalidWindow { .. } => false,
		}
	}
}
