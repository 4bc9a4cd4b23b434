use actix_web::{HttpResponse, Responder, post, web};
use log::info;

use crate::adapters::web::schema::WebhookAck;

/// Accepts platform notifications. Payloads are only logged.
#[post("/webhooks/square")]
pub async fn square_webhook(body: web::Bytes) -> impl Responder {
	info!(
		"Received webhook ({} bytes): {}",
		body.len(),
		String::from_utf8_lossy(&body)
	);
	HttpResponse::Ok().json(WebhookAck { received: true })
}
