use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
	Pending,
	Accepted,
	NoShow,
	CancelledByCustomer,
	CancelledBySeller,
	Declined,
	#[serde(other)]
	Unknown,
}

impl BookingStatus {
	/// Only bookings that actually took place (or were missed by the
	/// customer) are invoiced.
	pub fn is_billable(&self) -> bool {
		matches!(self, BookingStatus::Accepted | BookingStatus::NoShow)
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AppointmentSegment {
	pub service_variation_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Booking {
	pub id:                   String,
	pub status:               BookingStatus,
	pub customer_id:          String,
	pub location_id:          String,
	#[serde(with = "time::serde::rfc3339")]
	pub start_at:             OffsetDateTime,
	#[serde(default)]
	pub appointment_segments: Vec<AppointmentSegment>,
}
