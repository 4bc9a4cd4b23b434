use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::booking::Booking;
use crate::domain::catalog::CatalogItem;
use crate::domain::customer::Customer;
use crate::domain::errors::PlatformError;
use crate::domain::invoice::Invoice;
use crate::domain::order::Order;

/// Booking, catalog, order, invoice and customer operations of the payments
/// platform. Every mutation takes a caller-supplied idempotency key; repeated
/// calls with the same key must not create a second resource.
#[async_trait]
pub trait PaymentsPlatform: Send + Sync + 'static {
	/// Bookings starting in `[start, end)`.
	async fn list_bookings(
		&self,
		start: OffsetDateTime,
		end: OffsetDateTime,
	) -> Result<Vec<Booking>, PlatformError>;
	async fn list_catalog_items(&self) -> Result<Vec<CatalogItem>, PlatformError>;
	async fn create_order(
		&self,
		order: &Order,
		idempotency_key: &str,
	) -> Result<Order, PlatformError>;
	async fn create_invoice(
		&self,
		invoice: &Invoice,
		idempotency_key: &str,
	) -> Result<Invoice, PlatformError>;
	async fn publish_invoice(
		&self,
		invoice_id: &str,
		version: i32,
		idempotency_key: &str,
	) -> Result<Invoice, PlatformError>;
	async fn retrieve_customer(
		&self,
		customer_id: &str,
	) -> Result<Customer, PlatformError>;
}

/// Source of the platform access token, resolved once at process start.
#[async_trait]
pub trait AccessTokenSource: Send + Sync + 'static {
	async fn access_token(&self) -> Result<String, PlatformError>;
}
