use log::warn;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::booking::{AppointmentSegment, Booking, BookingStatus};
use crate::domain::catalog::{CatalogItem, CatalogItemVariation, Money};
use crate::domain::customer::Customer;
use crate::domain::errors::PlatformError;
use crate::domain::invoice::Invoice;
use crate::domain::order::Order;

pub const VERSION_MISMATCH_CODE: &str = "VERSION_MISMATCH";
pub const CONFLICT_CODE: &str = "CONFLICT";

#[derive(Debug, Deserialize, Clone)]
pub struct SquareError {
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub code:     String,
	#[serde(default)]
	pub detail:   Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ErrorResponse {
	#[serde(default)]
	pub errors: Vec<SquareError>,
}

impl ErrorResponse {
	/// Maps a non-success response to a [`PlatformError`]. Conflicting
	/// versions are told apart from every other rejection.
	pub fn into_platform_error(self, status: u16) -> PlatformError {
		let first = self.errors.into_iter().next();
		let (code, detail) = match first {
			Some(error) => {
				let detail = error.detail.unwrap_or_else(|| error.category.clone());
				(error.code, detail)
			}
			None => (String::new(), format!("HTTP {status}")),
		};

		if status == 409 || code == VERSION_MISMATCH_CODE || code == CONFLICT_CODE {
			return PlatformError::VersionConflict { detail };
		}

		PlatformError::Declined {
			status,
			code,
			detail,
		}
	}
}

/// Bookings are kept as raw values so that one odd entry cannot reject the
/// whole page.
#[derive(Debug, Deserialize)]
pub struct ListBookingsResponse {
	#[serde(default)]
	pub bookings: Vec<serde_json::Value>,
	pub cursor:   Option<String>,
}

/// Booking as listed by the platform, where most fields may be absent.
#[derive(Debug, Deserialize)]
pub struct BookingRecord {
	#[serde(default)]
	pub id:                   String,
	#[serde(default = "unknown_status")]
	pub status:               BookingStatus,
	pub customer_id:          Option<String>,
	pub location_id:          Option<String>,
	#[serde(with = "time::serde::rfc3339::option", default)]
	pub start_at:             Option<OffsetDateTime>,
	#[serde(default)]
	pub appointment_segments: Vec<AppointmentSegment>,
}

fn unknown_status() -> BookingStatus {
	BookingStatus::Unknown
}

impl BookingRecord {
	/// `Ok(None)` for an incomplete booking that would not be invoiced
	/// anyway. An incomplete billable booking is an error.
	pub fn into_booking(self) -> Result<Option<Booking>, PlatformError> {
		match (self.customer_id, self.location_id, self.start_at) {
			(Some(customer_id), Some(location_id), Some(start_at)) => {
				Ok(Some(Booking {
					id: self.id,
					status: self.status,
					customer_id,
					location_id,
					start_at,
					appointment_segments: self.appointment_segments,
				}))
			}
			_ if self.status.is_billable() => Err(PlatformError::InvalidResponse {
				detail: format!(
					"billable booking {} lacks customer, location or start time",
					self.id
				),
			}),
			_ => Ok(None),
		}
	}
}

fn is_billable_value(value: &serde_json::Value) -> bool {
	value
		.get("status")
		.cloned()
		.and_then(|status| serde_json::from_value::<BookingStatus>(status).ok())
		.is_some_and(|status| status.is_billable())
}

impl ListBookingsResponse {
	/// Converts the page, skipping entries that are malformed or incomplete
	/// but not billable. Fails only when a billable booking cannot be used.
	pub fn into_bookings(self) -> Result<Vec<Booking>, PlatformError> {
		let mut bookings = Vec::with_capacity(self.bookings.len());
		for value in self.bookings {
			let billable = is_billable_value(&value);
			let record = match serde_json::from_value::<BookingRecord>(value) {
				Ok(record) => record,
				Err(e) if billable => {
					return Err(PlatformError::InvalidResponse {
						detail: format!("malformed billable booking: {e}"),
					});
				}
				Err(e) => {
					warn!("Skipping malformed booking entry: {e}");
					continue;
				}
			};

			let booking_id = record.id.clone();
			match record.into_booking()? {
				Some(booking) => bookings.push(booking),
				None => warn!("Skipping incomplete non-billable booking {booking_id}"),
			}
		}
		Ok(bookings)
	}
}

#[derive(Debug, Deserialize)]
pub struct ListCatalogResponse {
	#[serde(default)]
	pub objects: Vec<CatalogObject>,
	pub cursor:  Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogObject {
	#[serde(rename = "type")]
	pub object_type: String,
	pub id:          String,
	#[serde(default)]
	pub is_deleted:  bool,
	pub item_data:   Option<CatalogItemData>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItemData {
	#[serde(default)]
	pub name:       String,
	#[serde(default)]
	pub variations: Vec<CatalogVariationObject>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogVariationObject {
	pub id:                  String,
	#[serde(default)]
	pub is_deleted:          bool,
	pub item_variation_data: Option<CatalogItemVariationData>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItemVariationData {
	#[serde(default)]
	pub name:        String,
	pub price_money: Option<Money>,
}

impl CatalogObject {
	pub fn into_item(self) -> Option<CatalogItem> {
		if self.is_deleted || self.object_type != "ITEM" {
			return None;
		}
		let data = self.item_data?;
		let variations = data
			.variations
			.into_iter()
			.filter(|variation| !variation.is_deleted)
			.map(|variation| {
				let (name, price) = match variation.item_variation_data {
					Some(data) => (data.name, data.price_money),
					None => (String::new(), None),
				};
				CatalogItemVariation {
					id: variation.id,
					name,
					price,
				}
			})
			.collect();

		Some(CatalogItem {
			id: self.id,
			name: data.name,
			variations,
		})
	}
}

#[derive(Debug, Serialize)]
pub struct CreateOrderRequest<'a> {
	pub order:           &'a Order,
	pub idempotency_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
	pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceRequest<'a> {
	pub invoice:         &'a Invoice,
	pub idempotency_key: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PublishInvoiceRequest<'a> {
	pub version:         i32,
	pub idempotency_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceResponse {
	pub invoice: Invoice,
}

#[derive(Debug, Deserialize)]
pub struct CustomerResponse {
	pub customer: Customer,
}
