use booking_invoicer::domain::booking::{Booking, BookingStatus};
use booking_invoicer::domain::queue::{
	Message, ORDERS_QUEUE_KEY, Queue, message_id_for,
};
use booking_invoicer::infrastructure::config::redis::{
	dead_letter_key, processing_key,
};
use booking_invoicer::infrastructure::queue::redis_queue::RedisQueue;
use redis::AsyncCommands;

mod support;

use crate::support::fixtures::booking;
use crate::support::redis_container::get_test_redis_client;

const CONSUMER: &str = "worker-a";

fn message(id: &str) -> Message<Booking> {
	Message::with(
		message_id_for(ORDERS_QUEUE_KEY, id),
		booking(id, BookingStatus::Accepted, &["V1"]),
	)
}

fn orders_queue(
	client: &redis::Client,
	consumer: &str,
	max_deliveries: u32,
) -> RedisQueue<Booking> {
	RedisQueue::new(client.clone(), ORDERS_QUEUE_KEY, consumer, max_deliveries)
}

async fn list_len(client: &redis::Client, key: &str) -> usize {
	let mut con = client.get_multiplexed_async_connection().await.unwrap();
	con.llen(key).await.unwrap()
}

#[tokio::test]
async fn test_push_pop_ack_in_order() {
	let redis_container = get_test_redis_client().await;
	let redis_client = redis_container.client;
	let queue = orders_queue(&redis_client, CONSUMER, 5);

	queue.push(message("B1")).await.unwrap();
	queue.push(message("B2")).await.unwrap();

	let first = queue.pop().await.unwrap().unwrap();
	assert_eq!(first.body.id, "B1");
	assert_eq!(first.delivery_count, 0);
	assert_eq!(
		list_len(&redis_client, &processing_key(ORDERS_QUEUE_KEY, CONSUMER)).await,
		1
	);

	queue.ack(&first).await.unwrap();
	assert_eq!(
		list_len(&redis_client, &processing_key(ORDERS_QUEUE_KEY, CONSUMER)).await,
		0
	);

	let second = queue.pop().await.unwrap().unwrap();
	assert_eq!(second.body.id, "B2");
}

#[tokio::test]
async fn test_pop_empty_returns_none() {
	let redis_container = get_test_redis_client().await;
	let queue = orders_queue(&redis_container.client, CONSUMER, 5);

	assert!(queue.pop().await.unwrap().is_none());
}

#[tokio::test]
async fn test_retry_redelivers_then_dead_letters() {
	let redis_container = get_test_redis_client().await;
	let redis_client = redis_container.client;
	let queue = orders_queue(&redis_client, CONSUMER, 2);
	queue.push(message("B1")).await.unwrap();

	let popped = queue.pop().await.unwrap().unwrap();
	queue.retry(popped).await.unwrap();

	let redelivered = queue.pop().await.unwrap().unwrap();
	assert_eq!(redelivered.body.id, "B1");
	assert_eq!(redelivered.delivery_count, 1);
	queue.retry(redelivered).await.unwrap();

	assert!(queue.pop().await.unwrap().is_none());
	assert_eq!(queue.dead_letter_len().await.unwrap(), 1);
	assert_eq!(
		list_len(&redis_client, &processing_key(ORDERS_QUEUE_KEY, CONSUMER)).await,
		0
	);
}

#[tokio::test]
async fn test_dead_letter_removes_from_processing() {
	let redis_container = get_test_redis_client().await;
	let redis_client = redis_container.client;
	let queue = orders_queue(&redis_client, CONSUMER, 5);
	queue.push(message("B1")).await.unwrap();

	let popped = queue.pop().await.unwrap().unwrap();
	queue.dead_letter(popped).await.unwrap();

	assert_eq!(queue.dead_letter_len().await.unwrap(), 1);
	assert_eq!(
		list_len(&redis_client, &processing_key(ORDERS_QUEUE_KEY, CONSUMER)).await,
		0
	);
}

#[tokio::test]
async fn test_unacknowledged_messages_are_recovered() {
	let redis_container = get_test_redis_client().await;
	let redis_client = redis_container.client;
	let crashed = orders_queue(&redis_client, CONSUMER, 5);
	crashed.push(message("B1")).await.unwrap();
	crashed.push(message("B2")).await.unwrap();
	crashed.pop().await.unwrap().unwrap();
	crashed.pop().await.unwrap().unwrap();

	let restarted = orders_queue(&redis_client, CONSUMER, 5);
	assert_eq!(restarted.recover_in_flight().await.unwrap(), 2);

	let first = restarted.pop().await.unwrap().unwrap();
	let second = restarted.pop().await.unwrap().unwrap();
	assert_eq!(first.body.id, "B1");
	assert_eq!(second.body.id, "B2");
	restarted.ack(&first).await.unwrap();
	restarted.ack(&second).await.unwrap();
	assert_eq!(restarted.recover_in_flight().await.unwrap(), 0);
}

#[tokio::test]
async fn test_undecodable_message_is_dead_lettered() {
	let redis_container = get_test_redis_client().await;
	let redis_client = redis_container.client;
	let queue = orders_queue(&redis_client, CONSUMER, 5);
	let mut con = redis_client.get_multiplexed_async_connection().await.unwrap();
	let _: () = con.lpush(ORDERS_QUEUE_KEY, "not a message").await.unwrap();

	assert!(queue.pop().await.is_err());

	assert_eq!(
		list_len(&redis_client, &dead_letter_key(ORDERS_QUEUE_KEY)).await,
		1
	);
	assert_eq!(
		list_len(&redis_client, &processing_key(ORDERS_QUEUE_KEY, CONSUMER)).await,
		0
	);
	assert!(queue.pop().await.unwrap().is_none());
}

#[tokio::test]
async fn test_recovery_leaves_other_consumers_in_flight_messages() {
	let redis_container = get_test_redis_client().await;
	let redis_client = redis_container.client;
	let busy = orders_queue(&redis_client, "worker-a", 5);
	let restarted = orders_queue(&redis_client, "worker-b", 5);
	busy.push(message("B1")).await.unwrap();
	let in_flight = busy.pop().await.unwrap().unwrap();

	assert_eq!(restarted.recover_in_flight().await.unwrap(), 0);
	assert!(restarted.pop().await.unwrap().is_none());

	busy.ack(&in_flight).await.unwrap();
	assert_eq!(
		list_len(&redis_client, &processing_key(ORDERS_QUEUE_KEY, "worker-a")).await,
		0
	);
}
