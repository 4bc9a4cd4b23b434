use std::marker::PhantomData;

use async_trait::async_trait;
use log::warn;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Direction};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::queue::{Message, Queue};
use crate::infrastructure::config::redis::{dead_letter_key, processing_key};

/// Redis list queue with at-least-once delivery. Popped messages are moved to
/// the consumer's own processing list and only removed from it on `ack`, so a
/// crashed consumer leaves them recoverable.
pub struct RedisQueue<B> {
	client:         Client,
	key:            String,
	processing_key: String,
	dead_key:       String,
	max_deliveries: u32,
	pop_timeout:    f64,
	_body:          PhantomData<fn() -> B>,
}

impl<B> Clone for RedisQueue<B> {
	fn clone(&self) -> Self {
		Self {
			client:         self.client.clone(),
			key:            self.key.clone(),
			processing_key: self.processing_key.clone(),
			dead_key:       self.dead_key.clone(),
			max_deliveries: self.max_deliveries,
			pop_timeout:    self.pop_timeout,
			_body:          PhantomData,
		}
	}
}

fn boxed<E: std::error::Error + Send + 'static>(
	e: E,
) -> Box<dyn std::error::Error + Send> {
	Box::new(e)
}

impl<B> RedisQueue<B> {
	pub fn new(
		client: Client,
		key: &str,
		consumer: &str,
		max_deliveries: u32,
	) -> Self {
		Self {
			client,
			key: key.to_string(),
			processing_key: processing_key(key, consumer),
			dead_key: dead_letter_key(key),
			max_deliveries,
			pop_timeout: 1.0,
			_body: PhantomData,
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	async fn connection(
		&self,
	) -> Result<MultiplexedConnection, Box<dyn std::error::Error + Send>> {
		self.client
			.get_multiplexed_async_connection()
			.await
			.map_err(boxed)
	}

	/// Moves messages this consumer left unacknowledged before it died back to
	/// the head of the queue, oldest first. Other consumers' in-flight
	/// messages are left alone. Returns how many were moved.
	pub async fn recover_in_flight(
		&self,
	) -> Result<usize, Box<dyn std::error::Error + Send>> {
		let mut con = self.connection().await?;
		let mut recovered = 0;
		loop {
			let moved: Option<String> = con
				.lmove(
					&self.processing_key,
					&self.key,
					Direction::Left,
					Direction::Right,
				)
				.await
				.map_err(boxed)?;
			if moved.is_none() {
				return Ok(recovered);
			}
			recovered += 1;
		}
	}

	pub async fn dead_letter_len(
		&self,
	) -> Result<usize, Box<dyn std::error::Error + Send>> {
		let mut con = self.connection().await?;
		con.llen(&self.dead_key).await.map_err(boxed)
	}

	async fn remove_from_processing(
		&self,
		con: &mut MultiplexedConnection,
		message: &Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>>
	where
		B: Serialize,
	{
		let receipt = match &message.receipt {
			Some(receipt) => receipt.clone(),
			None => serde_json::to_string(message).map_err(boxed)?,
		};
		let _: i64 = con
			.lrem(&self.processing_key, 1, receipt)
			.await
			.map_err(boxed)?;
		Ok(())
	}

	async fn requeue_to(
		&self,
		list_key: &str,
		mut message: Message<B>,
		bump_delivery: bool,
	) -> Result<(), Box<dyn std::error::Error + Send>>
	where
		B: Serialize,
	{
		let mut con = self.connection().await?;
		let receipt = message.receipt.take();
		if bump_delivery {
			message.delivery_count += 1;
		}
		let serialized_message = serde_json::to_string(&message).map_err(boxed)?;

		let mut pipe = redis::pipe();
		pipe.atomic();
		if let Some(receipt) = receipt {
			pipe.lrem(&self.processing_key, 1, receipt).ignore();
		}
		pipe.lpush(list_key, serialized_message).ignore();
		pipe.query_async::<()>(&mut con).await.map_err(boxed)
	}
}

#[async_trait]
impl<B> Queue<B> for RedisQueue<B>
where
	B: Serialize + DeserializeOwned + Send + Sync + 'static,
{
	async fn pop(
		&self,
	) -> Result<Option<Message<B>>, Box<dyn std::error::Error + Send>> {
		let mut con = self.connection().await?;

		let popped_value: Option<String> = con
			.blmove(
				&self.key,
				&self.processing_key,
				Direction::Right,
				Direction::Left,
				self.pop_timeout,
			)
			.await
			.map_err(boxed)?;

		let serialized_message = match popped_value {
			Some(serialized_message) => serialized_message,
			None => return Ok(None),
		};

		match serde_json::from_str::<Message<B>>(&serialized_message) {
			Ok(mut message) => {
				message.receipt = Some(serialized_message);
				Ok(Some(message))
			}
			Err(e) => {
				warn!(
					"Dead-lettering undecodable message from '{}': {e}",
					self.key
				);
				redis::pipe()
					.atomic()
					.lrem(&self.processing_key, 1, &serialized_message)
					.ignore()
					.lpush(&self.dead_key, &serialized_message)
					.ignore()
					.query_async::<()>(&mut con)
					.await
					.map_err(boxed)?;
				Err(boxed(e))
			}
		}
	}

	async fn push(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		let mut con = self.connection().await?;

		let serialized_message = serde_json::to_string(&message).map_err(boxed)?;

		let _: () = con
			.lpush(&self.key, serialized_message)
			.await
			.map_err(boxed)?;
		Ok(())
	}

	async fn ack(
		&self,
		message: &Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		let mut con = self.connection().await?;
		self.remove_from_processing(&mut con, message).await
	}

	async fn retry(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		if message.delivery_count + 1 >= self.max_deliveries {
			warn!(
				"Message {} on '{}' exhausted {} deliveries, dead-lettering",
				message.id, self.key, self.max_deliveries
			);
			return self.requeue_to(&self.dead_key, message, true).await;
		}
		self.requeue_to(&self.key, message, true).await
	}

	async fn dead_letter(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		self.requeue_to(&self.dead_key, message, false).await
	}
}
