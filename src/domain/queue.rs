use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::PipelineError;

/// Stage names. Each is also the name of the queue feeding that stage.
pub const ORDERS_QUEUE_KEY: &str = "orders";
pub const INVOICES_QUEUE_KEY: &str = "invoices";
pub const PUBLISH_QUEUE_KEY: &str = "publish";

/// Namespace for deterministic message ids. Every stage derives the id of the
/// message it emits from the stage name and the booking (or invoice) id, so a
/// re-listed booking produces the same id and therefore the same idempotency
/// key downstream.
const MESSAGE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_3b2a_9d4e_4c1f_8a7b_52e0_d3c4_b5a6);

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Message<B> {
	pub id:             Uuid,
	#[serde(default)]
	pub delivery_count: u32,
	pub body:           B,
	/// Raw payload as read from the transport, used to acknowledge it.
	#[serde(skip)]
	pub receipt:        Option<String>,
}

impl<B> Message<B> {
	pub fn with(id: Uuid, body: B) -> Message<B> {
		Message {
			id,
			delivery_count: 0,
			body,
			receipt: None,
		}
	}

	pub fn idempotency_key(&self) -> String {
		self.id.to_string()
	}
}

pub fn message_id_for(stage: &str, key: &str) -> Uuid {
	Uuid::new_v5(&MESSAGE_ID_NAMESPACE, format!("{stage}:{key}").as_bytes())
}

#[async_trait]
pub trait Queue<B>: Send + Sync + 'static {
	async fn pop(
		&self,
	) -> Result<Option<Message<B>>, Box<dyn std::error::Error + Send>>;
	async fn push(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>>;
	async fn ack(
		&self,
		message: &Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>>;
	/// Hands the message back to the transport for redelivery. The transport
	/// decides whether it is redelivered or dead-lettered.
	async fn retry(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>>;
	async fn dead_letter(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>>;
}

#[async_trait]
pub trait MessageHandler<B>: Send + Sync + 'static {
	async fn handle(&self, message: Message<B>) -> Result<(), PipelineError>;
}
