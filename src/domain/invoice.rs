use serde::{Deserialize, Serialize};
use time::{Date, Duration, UtcOffset};

use crate::domain::booking::Booking;
use crate::domain::errors::PipelineError;
use crate::domain::order::Order;

/// Days between the service date and the balance due date.
pub const PAYMENT_TERM_DAYS: i64 = 7;
pub const REMINDER_RELATIVE_DAYS: i32 = -1;
pub const REMINDER_MESSAGE: &str = "Your invoice is due tomorrow";

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
	Email,
	ShareManually,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceRequestType {
	Balance,
	Deposit,
	Installment,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomaticPaymentSource {
	None,
	CardOnFile,
	BankOnFile,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
	Draft,
	Unpaid,
	Scheduled,
	PartiallyPaid,
	Paid,
	PartiallyRefunded,
	Refunded,
	Canceled,
	Failed,
	PaymentPending,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct InvoiceRecipient {
	pub customer_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PaymentReminder {
	pub relative_scheduled_days: i32,
	pub message:                 String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
	pub request_type:             InvoiceRequestType,
	#[serde(with = "calendar_date")]
	pub due_date:                 Date,
	pub automatic_payment_source: AutomaticPaymentSource,
	#[serde(default)]
	pub reminders:                Vec<PaymentReminder>,
}

impl PaymentRequest {
	/// A single balance request due [`PAYMENT_TERM_DAYS`] after the service
	/// date, reminding the customer the day before.
	pub fn balance_due_after(service_date: Date) -> Self {
		PaymentRequest {
			request_type:             InvoiceRequestType::Balance,
			due_date:                 service_date + Duration::days(PAYMENT_TERM_DAYS),
			automatic_payment_source: AutomaticPaymentSource::None,
			reminders:                vec![PaymentReminder {
				relative_scheduled_days: REMINDER_RELATIVE_DAYS,
				message:                 REMINDER_MESSAGE.to_string(),
			}],
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AcceptedPaymentMethods {
	pub card:             bool,
	pub square_gift_card: bool,
	pub bank_account:     bool,
}

impl AcceptedPaymentMethods {
	pub fn all() -> Self {
		AcceptedPaymentMethods {
			card:             true,
			square_gift_card: true,
			bank_account:     true,
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Invoice {
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub id:                       Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub version:                  Option<i32>,
	pub location_id:              String,
	pub order_id:                 String,
	pub primary_recipient:        InvoiceRecipient,
	pub payment_requests:         Vec<PaymentRequest>,
	pub accepted_payment_methods: AcceptedPaymentMethods,
	pub delivery_method:          DeliveryMethod,
	#[serde(with = "calendar_date")]
	pub sale_or_service_date:     Date,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub status:                   Option<InvoiceStatus>,
}

impl Invoice {
	pub fn draft_for(
		booking_invoice: &BookingInvoice,
		delivery_method: DeliveryMethod,
	) -> Result<Self, PipelineError> {
		let booking = &booking_invoice.booking;
		let order_id = booking_invoice.order.id.clone().ok_or_else(|| {
			PipelineError::InvalidOrder {
				booking_id: booking.id.clone(),
				reason:     "order has no platform id".to_string(),
			}
		})?;
		let service_date = booking.start_at.to_offset(UtcOffset::UTC).date();

		Ok(Invoice {
			id: None,
			version: None,
			location_id: booking.location_id.clone(),
			order_id,
			primary_recipient: InvoiceRecipient {
				customer_id: booking.customer_id.clone(),
			},
			payment_requests: vec![PaymentRequest::balance_due_after(service_date)],
			accepted_payment_methods: AcceptedPaymentMethods::all(),
			delivery_method,
			sale_or_service_date: service_date,
			status: None,
		})
	}
}

/// Unit of work handed from the order stage to the invoice stage.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BookingInvoice {
	pub booking: Booking,
	pub order:   Order,
}

impl BookingInvoice {
	pub fn new(booking: Booking, order: Order) -> Result<Self, PipelineError> {
		if order.id.is_none() {
			return Err(PipelineError::InvalidOrder {
				booking_id: booking.id,
				reason:     "order has no platform id".to_string(),
			});
		}
		if !order.belongs_to(&booking) {
			return Err(PipelineError::InvalidOrder {
				booking_id: booking.id,
				reason:     "order customer or location differs from booking"
					.to_string(),
			});
		}
		Ok(BookingInvoice { booking, order })
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
	pub invoice_id: String,
	pub version:    i32,
}

impl PublishRequest {
	pub fn for_invoice(invoice: &Invoice) -> Option<Self> {
		Some(PublishRequest {
			invoice_id: invoice.id.clone()?,
			version:    invoice.version?,
		})
	}
}
