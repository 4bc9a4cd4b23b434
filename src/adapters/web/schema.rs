use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct IngestRequest {
	#[serde(with = "time::serde::rfc3339::option", default)]
	pub start: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339::option", default)]
	pub end:   Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestResponse {
	pub start:  String,
	pub end:    String,
	pub listed: usize,
	pub queued: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookAck {
	pub received: bool,
}

/// Lookback used when the on-demand trigger omits `start`.
#[derive(Debug, Clone, Copy)]
pub struct IngestDefaults {
	pub lookback_days: u32,
}
