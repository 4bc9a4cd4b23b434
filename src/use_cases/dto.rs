use serde::{Deserialize, Serialize};

use crate::domain::invoice::Invoice;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct IngestionReport {
	pub listed: usize,
	pub queued: usize,
}

/// Where a booking's chain ended after the invoice stage.
#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceOutcome {
	QueuedForPublish(Invoice),
	AwaitingManualShare(Invoice),
}
