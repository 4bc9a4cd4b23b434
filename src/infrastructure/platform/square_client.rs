use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use crate::domain::booking::Booking;
use crate::domain::catalog::CatalogItem;
use crate::domain::customer::Customer;
use crate::domain::errors::PlatformError;
use crate::domain::invoice::Invoice;
use crate::domain::order::Order;
use crate::domain::platform::{AccessTokenSource, PaymentsPlatform};
use crate::domain::schedule::format_utc;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::platform::square_schema::{
	CatalogObject, CreateInvoiceRequest, CreateOrderRequest, CustomerResponse,
	ErrorResponse, InvoiceResponse, ListBookingsResponse, ListCatalogResponse,
	OrderResponse, PublishInvoiceRequest,
};

const BOOKINGS_PAGE_LIMIT: &str = "100";

/// Access token fixed for the lifetime of the process.
pub struct StaticAccessToken {
	token: String,
}

impl StaticAccessToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: token.into(),
		}
	}
}

#[async_trait]
impl AccessTokenSource for StaticAccessToken {
	async fn access_token(&self) -> Result<String, PlatformError> {
		if self.token.is_empty() {
			return Err(PlatformError::Credentials {
				detail: "access token is empty".to_string(),
			});
		}
		Ok(self.token.clone())
	}
}

fn transport(e: reqwest::Error) -> PlatformError {
	PlatformError::Transport {
		detail: e.to_string(),
	}
}

#[derive(Clone)]
pub struct SquarePlatform {
	http_client: Client,
	base_url:    String,
	api_version: String,
	token:       Arc<dyn AccessTokenSource>,
}

impl SquarePlatform {
	pub fn new(
		http_client: Client,
		base_url: impl Into<String>,
		api_version: impl Into<String>,
		token: Arc<dyn AccessTokenSource>,
	) -> Self {
		Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			api_version: api_version.into(),
			token,
		}
	}

	pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(config.request_timeout_secs))
			.build()?;
		Ok(Self::new(
			http_client,
			config.square_base_url.clone(),
			config.square_api_version.clone(),
			Arc::new(StaticAccessToken::new(config.square_access_token.clone())),
		))
	}

	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.base_url)
	}

	async fn send<T: DeserializeOwned>(
		&self,
		request: RequestBuilder,
	) -> Result<T, PlatformError> {
		let token = self.token.access_token().await?;
		let resp = request
			.bearer_auth(token)
			.header("Square-Version", &self.api_version)
			.send()
			.await
			.map_err(transport)?;

		let status = resp.status();
		if status.is_success() {
			return resp.json::<T>().await.map_err(|e| {
				PlatformError::InvalidResponse {
					detail: e.to_string(),
				}
			});
		}

		let body = resp.json::<ErrorResponse>().await.unwrap_or_default();
		Err(body.into_platform_error(status.as_u16()))
	}
}

#[async_trait]
impl PaymentsPlatform for SquarePlatform {
	async fn list_bookings(
		&self,
		start: OffsetDateTime,
		end: OffsetDateTime,
	) -> Result<Vec<Booking>, PlatformError> {
		let start_at_min = format_utc(start);
		let start_at_max = format_utc(end);
		let mut bookings = Vec::new();
		let mut cursor: Option<String> = None;

		loop {
			let mut query = vec![
				("start_at_min", start_at_min.clone()),
				("start_at_max", start_at_max.clone()),
				("limit", BOOKINGS_PAGE_LIMIT.to_string()),
			];
			if let Some(cursor) = &cursor {
				query.push(("cursor", cursor.clone()));
			}

			let page: ListBookingsResponse = self
				.send(self.http_client.get(self.url("/v2/bookings")).query(&query))
				.await?;
			debug!("Fetched page of {} bookings", page.bookings.len());
			let next_cursor = page.cursor.clone();

			// The platform treats start_at_max as inclusive.
			bookings.extend(
				page.into_bookings()?
					.into_iter()
					.filter(|booking| booking.start_at < end),
			);

			cursor = next_cursor.filter(|c| !c.is_empty());
			if cursor.is_none() {
				return Ok(bookings);
			}
		}
	}

	async fn list_catalog_items(&self) -> Result<Vec<CatalogItem>, PlatformError> {
		let mut items = Vec::new();
		let mut cursor: Option<String> = None;

		loop {
			let mut query = vec![("types", "ITEM".to_string())];
			if let Some(cursor) = &cursor {
				query.push(("cursor", cursor.clone()));
			}

			let page: ListCatalogResponse = self
				.send(self.http_client.get(self.url("/v2/catalog/list")).query(&query))
				.await?;

			items.extend(page.objects.into_iter().filter_map(CatalogObject::into_item));

			cursor = page.cursor.filter(|c| !c.is_empty());
			if cursor.is_none() {
				return Ok(items);
			}
		}
	}

	async fn create_order(
		&self,
		order: &Order,
		idempotency_key: &str,
	) -> Result<Order, PlatformError> {
		let body = CreateOrderRequest {
			order,
			idempotency_key,
		};
		let resp: OrderResponse = self
			.send(self.http_client.post(self.url("/v2/orders")).json(&body))
			.await?;
		Ok(resp.order)
	}

	async fn create_invoice(
		&self,
		invoice: &Invoice,
		idempotency_key: &str,
	) -> Result<Invoice, PlatformError> {
		let body = CreateInvoiceRequest {
			invoice,
			idempotency_key,
		};
		let resp: InvoiceResponse = self
			.send(self.http_client.post(self.url("/v2/invoices")).json(&body))
			.await?;
		Ok(resp.invoice)
	}

	async fn publish_invoice(
		&self,
		invoice_id: &str,
		version: i32,
		idempotency_key: &str,
	) -> Result<Invoice, PlatformError> {
		let body = PublishInvoiceRequest {
			version,
			idempotency_key,
		};
		let resp: InvoiceResponse = self
			.send(
				self.http_client
					.post(self.url(&format!("/v2/invoices/{invoice_id}/publish")))
					.json(&body),
			)
			.await?;
		Ok(resp.invoice)
	}

	async fn retrieve_customer(
		&self,
		customer_id: &str,
	) -> Result<Customer, PlatformError> {
		let resp: CustomerResponse = self
			.send(
				self.http_client
					.get(self.url(&format!("/v2/customers/{customer_id}"))),
			)
			.await?;
		Ok(resp.customer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_static_token_rejects_empty_token() {
		assert!(StaticAccessToken::new("").access_token().await.is_err());
		assert_eq!(
			StaticAccessToken::new("abc").access_token().await.unwrap(),
			"abc"
		);
	}

	#[test]
	fn test_base_url_trailing_slash_is_trimmed() {
		let platform = SquarePlatform::new(
			Client::new(),
			"https://connect.squareupsandbox.com/",
			"2024-01-18",
			Arc::new(StaticAccessToken::new("abc")),
		);

		assert_eq!(
			platform.url("/v2/orders"),
			"https://connect.squareupsandbox.com/v2/orders"
		);
	}
}
