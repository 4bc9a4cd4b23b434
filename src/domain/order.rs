use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::booking::Booking;
use crate::domain::catalog::{CatalogLine, Money};

/// Metadata key linking a service charge back to its booking.
pub const APPOINTMENT_METADATA_KEY: &str = "appointment";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationPhase {
	SubtotalPhase,
	TotalPhase,
	ApportionedPercentagePhase,
	ApportionedAmountPhase,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OrderServiceCharge {
	pub name:              String,
	pub amount_money:      Money,
	pub calculation_phase: CalculationPhase,
	#[serde(default)]
	pub metadata:          BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Order {
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub id:              Option<String>,
	pub location_id:     String,
	pub customer_id:     Option<String>,
	#[serde(default)]
	pub service_charges: Vec<OrderServiceCharge>,
}

impl Order {
	/// One total-phase service charge per resolved catalog line, in segment
	/// order, for the booking's location and customer.
	pub fn for_booking(booking: &Booking, lines: &[CatalogLine]) -> Self {
		let service_charges = lines
			.iter()
			.map(|line| OrderServiceCharge {
				name:              line.item_name.clone(),
				amount_money:      line.unit_price.clone(),
				calculation_phase: CalculationPhase::TotalPhase,
				metadata:          BTreeMap::from([(
					APPOINTMENT_METADATA_KEY.to_string(),
					booking.id.clone(),
				)]),
			})
			.collect();

		Order {
			id: None,
			location_id: booking.location_id.clone(),
			customer_id: Some(booking.customer_id.clone()),
			service_charges,
		}
	}

	pub fn belongs_to(&self, booking: &Booking) -> bool {
		self.location_id == booking.location_id &&
			self.customer_id.as_deref() == Some(booking.customer_id.as_str())
	}

	/// Sum of the service charge amounts, or `None` when the order is empty,
	/// mixes currencies or overflows.
	pub fn total(&self) -> Option<Money> {
		let first = self.service_charges.first()?;
		let currency = &first.amount_money.currency;
		let mut amount: i64 = 0;
		for charge in &self.service_charges {
			if &charge.amount_money.currency != currency {
				return None;
			}
			amount = amount.checked_add(charge.amount_money.amount)?;
		}
		Some(Money {
			amount,
			currency: currency.clone(),
		})
	}
}
