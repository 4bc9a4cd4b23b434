use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::sleep;

use crate::domain::queue::{MessageHandler, Queue};

/// What happened to the message taken from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
	Idle,
	Acked,
	Retried,
	DeadLettered,
}

/// Pops one message and settles it: ack on success, redeliver on a retryable
/// failure, dead-letter otherwise.
pub async fn process_next<B, Q, H>(
	stage: &str,
	queue: &Q,
	handler: &H,
) -> Result<Delivery, Box<dyn std::error::Error + Send>>
where
	B: Clone + Send + Sync + 'static,
	Q: Queue<B>,
	H: MessageHandler<B>,
{
	let message = match queue.pop().await? {
		Some(message) => message,
		None => return Ok(Delivery::Idle),
	};

	let message_id = message.id;
	debug!(
		"[{stage}] Started processing message '{message_id}' (delivery {})",
		message.delivery_count + 1
	);

	match handler.handle(message.clone()).await {
		Ok(()) => {
			queue.ack(&message).await?;
			info!("[{stage}] Message '{message_id}' processed.");
			Ok(Delivery::Acked)
		}
		Err(e) if e.is_retryable() => {
			warn!("[{stage}] Message '{message_id}' failed, scheduling redelivery: {e}");
			queue.retry(message).await?;
			Ok(Delivery::Retried)
		}
		Err(e) => {
			error!("[{stage}] Message '{message_id}' failed permanently, dead-lettering: {e}");
			queue.dead_letter(message).await?;
			Ok(Delivery::DeadLettered)
		}
	}
}

pub async fn stage_worker<B, Q, H>(stage: &'static str, queue: Q, handler: H)
where
	B: Clone + Send + Sync + 'static,
	Q: Queue<B>,
	H: MessageHandler<B>,
{
	info!("[{stage}] Worker started");
	loop {
		match process_next(stage, &queue, &handler).await {
			Ok(Delivery::Idle) => {
				sleep(Duration::from_millis(250)).await;
			}
			Ok(_) => {}
			Err(e) => {
				error!("[{stage}] Failed to settle message: {e}");
				sleep(Duration::from_secs(1)).await;
			}
		}
	}
}
