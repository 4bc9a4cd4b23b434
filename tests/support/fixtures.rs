use booking_invoicer::domain::booking::{AppointmentSegment, Booking, BookingStatus};
use booking_invoicer::domain::catalog::{CatalogItem, CatalogItemVariation, Money};
use booking_invoicer::domain::customer::Customer;
use time::macros::datetime;

pub fn usd(amount: i64) -> Money {
	Money {
		amount,
		currency: "USD".to_string(),
	}
}

pub fn booking(id: &str, status: BookingStatus, variations: &[&str]) -> Booking {
	Booking {
		id: id.to_string(),
		status,
		customer_id: "C1".to_string(),
		location_id: "L1".to_string(),
		start_at: datetime!(2024-03-01 10:00 UTC),
		appointment_segments: variations
			.iter()
			.map(|variation| AppointmentSegment {
				service_variation_id: variation.to_string(),
			})
			.collect(),
	}
}

pub fn salon_catalog() -> Vec<CatalogItem> {
	vec![
		CatalogItem {
			id:         "I1".to_string(),
			name:       "Haircut".to_string(),
			variations: vec![CatalogItemVariation {
				id:    "V1".to_string(),
				name:  "Regular".to_string(),
				price: Some(usd(5000)),
			}],
		},
		CatalogItem {
			id:         "I2".to_string(),
			name:       "Colour".to_string(),
			variations: vec![
				CatalogItemVariation {
					id:    "V2".to_string(),
					name:  "Short".to_string(),
					price: Some(usd(8000)),
				},
				CatalogItemVariation {
					id:    "V3".to_string(),
					name:  "Long".to_string(),
					price: Some(usd(12000)),
				},
			],
		},
	]
}

pub fn customer(id: &str, email: Option<&str>) -> Customer {
	Customer {
		id:            id.to_string(),
		email_address: email.map(str::to_string),
	}
}
