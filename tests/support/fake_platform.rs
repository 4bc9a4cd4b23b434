use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use booking_invoicer::domain::booking::Booking;
use booking_invoicer::domain::catalog::CatalogItem;
use booking_invoicer::domain::customer::Customer;
use booking_invoicer::domain::errors::PlatformError;
use booking_invoicer::domain::invoice::{Invoice, InvoiceStatus};
use booking_invoicer::domain::order::Order;
use booking_invoicer::domain::platform::PaymentsPlatform;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	ListBookings,
	ListCatalog,
	CreateOrder,
	CreateInvoice,
	PublishInvoice,
	RetrieveCustomer,
}

#[derive(Default)]
struct State {
	bookings:         Vec<Booking>,
	catalog:          Vec<CatalogItem>,
	customers:        HashMap<String, Customer>,
	orders_by_key:    HashMap<String, Order>,
	invoices_by_key:  HashMap<String, Invoice>,
	invoices_by_id:   HashMap<String, Invoice>,
	published:        Vec<(String, i32)>,
	publish_attempts: Vec<(String, i32)>,
	listed_windows:   Vec<(OffsetDateTime, OffsetDateTime)>,
	failures:         HashMap<Operation, PlatformError>,
	next_id:          u32,
}

/// In-memory payments platform honouring idempotency keys and invoice
/// versions the way the real one does.
#[derive(Clone, Default)]
pub struct FakePlatform {
	state: Arc<Mutex<State>>,
}

impl FakePlatform {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap()
	}

	pub fn with_bookings(self, bookings: Vec<Booking>) -> Self {
		self.state().bookings = bookings;
		self
	}

	pub fn with_catalog(self, catalog: Vec<CatalogItem>) -> Self {
		self.state().catalog = catalog;
		self
	}

	pub fn with_customer(self, customer: Customer) -> Self {
		self.state()
			.customers
			.insert(customer.id.clone(), customer);
		self
	}

	pub fn fail(&self, operation: Operation, error: PlatformError) {
		self.state().failures.insert(operation, error);
	}

	pub fn recover(&self, operation: Operation) {
		self.state().failures.remove(&operation);
	}

	/// Simulates someone editing the draft on the platform after creation.
	pub fn bump_invoice_version(&self, invoice_id: &str) {
		if let Some(invoice) = self.state().invoices_by_id.get_mut(invoice_id) {
			invoice.version = invoice.version.map(|v| v + 1);
		}
	}

	pub fn orders(&self) -> Vec<Order> {
		self.state().orders_by_key.values().cloned().collect()
	}

	pub fn invoices(&self) -> Vec<Invoice> {
		self.state().invoices_by_id.values().cloned().collect()
	}

	pub fn published(&self) -> Vec<(String, i32)> {
		self.state().published.clone()
	}

	pub fn publish_attempts(&self) -> Vec<(String, i32)> {
		self.state().publish_attempts.clone()
	}

	pub fn listed_windows(&self) -> Vec<(OffsetDateTime, OffsetDateTime)> {
		self.state().listed_windows.clone()
	}

	fn check(&self, operation: Operation) -> Result<(), PlatformError> {
		match self.state().failures.get(&operation) {
			Some(error) => Err(error.clone()),
			None => Ok(()),
		}
	}

	fn next_id(&self, prefix: &str) -> String {
		let mut state = self.state();
		state.next_id += 1;
		format!("{prefix}{}", state.next_id)
	}
}

#[async_trait]
impl PaymentsPlatform for FakePlatform {
	async fn list_bookings(
		&self,
		start: OffsetDateTime,
		end: OffsetDateTime,
	) -> Result<Vec<Booking>, PlatformError> {
		self.check(Operation::ListBookings)?;
		let mut state = self.state();
		state.listed_windows.push((start, end));
		Ok(state
			.bookings
			.iter()
			.filter(|booking| booking.start_at >= start && booking.start_at < end)
			.cloned()
			.collect())
	}

	async fn list_catalog_items(&self) -> Result<Vec<CatalogItem>, PlatformError> {
		self.check(Operation::ListCatalog)?;
		Ok(self.state().catalog.clone())
	}

	async fn create_order(
		&self,
		order: &Order,
		idempotency_key: &str,
	) -> Result<Order, PlatformError> {
		self.check(Operation::CreateOrder)?;
		if let Some(existing) = self.state().orders_by_key.get(idempotency_key) {
			return Ok(existing.clone());
		}
		let mut created = order.clone();
		created.id = Some(self.next_id("O"));
		self.state()
			.orders_by_key
			.insert(idempotency_key.to_string(), created.clone());
		Ok(created)
	}

	async fn create_invoice(
		&self,
		invoice: &Invoice,
		idempotency_key: &str,
	) -> Result<Invoice, PlatformError> {
		self.check(Operation::CreateInvoice)?;
		if let Some(existing) = self.state().invoices_by_key.get(idempotency_key) {
			return Ok(existing.clone());
		}
		let mut created = invoice.clone();
		created.id = Some(self.next_id("INV"));
		created.version = Some(0);
		created.status = Some(InvoiceStatus::Draft);

		let mut state = self.state();
		state
			.invoices_by_key
			.insert(idempotency_key.to_string(), created.clone());
		state
			.invoices_by_id
			.insert(created.id.clone().unwrap_or_default(), created.clone());
		Ok(created)
	}

	async fn publish_invoice(
		&self,
		invoice_id: &str,
		version: i32,
		_idempotency_key: &str,
	) -> Result<Invoice, PlatformError> {
		self.check(Operation::PublishInvoice)?;
		let mut state = self.state();
		state.publish_attempts.push((invoice_id.to_string(), version));

		let invoice = state.invoices_by_id.get_mut(invoice_id).ok_or_else(|| {
			PlatformError::Declined {
				status: 404,
				code:   "NOT_FOUND".to_string(),
				detail: format!("invoice {invoice_id} not found"),
			}
		})?;
		if invoice.version != Some(version) {
			return Err(PlatformError::VersionConflict {
				detail: format!(
					"expected version {:?}, got {version}",
					invoice.version
				),
			});
		}
		invoice.version = Some(version + 1);
		invoice.status = Some(InvoiceStatus::Unpaid);
		let published = invoice.clone();
		state.published.push((invoice_id.to_string(), version));
		Ok(published)
	}

	async fn retrieve_customer(
		&self,
		customer_id: &str,
	) -> Result<Customer, PlatformError> {
		self.check(Operation::RetrieveCustomer)?;
		self.state()
			.customers
			.get(customer_id)
			.cloned()
			.ok_or_else(|| PlatformError::Declined {
				status: 404,
				code:   "NOT_FOUND".to_string(),
				detail: format!("customer {customer_id} not found"),
			})
	}
}
