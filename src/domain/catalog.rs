use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::booking::Booking;
use crate::domain::errors::PipelineError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Money {
	pub amount:   i64,
	pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItemVariation {
	pub id:    String,
	pub name:  String,
	/// `None` for variable-priced variations.
	pub price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
	pub id:         String,
	pub name:       String,
	pub variations: Vec<CatalogItemVariation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLine {
	pub service_variation_id: String,
	pub item_name:            String,
	pub unit_price:           Money,
}

/// Variation id to (item, variation) lookup over one catalog snapshot.
pub struct CatalogIndex<'a> {
	variations: HashMap<&'a str, (&'a CatalogItem, &'a CatalogItemVariation)>,
}

impl<'a> CatalogIndex<'a> {
	pub fn new(items: &'a [CatalogItem]) -> Self {
		let mut variations = HashMap::new();
		for item in items {
			for variation in &item.variations {
				variations
					.entry(variation.id.as_str())
					.or_insert((item, variation));
			}
		}
		Self { variations }
	}

	pub fn line_for(&self, service_variation_id: &str) -> Option<CatalogLine> {
		let (item, variation) = self.variations.get(service_variation_id)?;
		let unit_price = variation.price.clone()?;

		Some(CatalogLine {
			service_variation_id: service_variation_id.to_string(),
			item_name: item.name.clone(),
			unit_price,
		})
	}

	/// Resolves every appointment segment of `booking`, in order. Fails on the
	/// first segment that has no priced variation in the snapshot.
	pub fn resolve(
		&self,
		booking: &Booking,
	) -> Result<Vec<CatalogLine>, PipelineError> {
		booking
			.appointment_segments
			.iter()
			.map(|segment| {
				self.line_for(&segment.service_variation_id).ok_or_else(|| {
					PipelineError::MissingCatalogMapping {
						booking_id:           booking.id.clone(),
						service_variation_id: segment.service_variation_id.clone(),
					}
				})
			})
			.collect()
	}
}
