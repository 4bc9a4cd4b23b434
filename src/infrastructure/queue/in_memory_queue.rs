use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::queue::{Message, Queue};

struct QueueState<B> {
	ready:        VecDeque<Message<B>>,
	in_flight:    Vec<Message<B>>,
	dead_letters: Vec<Message<B>>,
}

/// Process-local queue with the same delivery semantics as the Redis one.
#[derive(Clone)]
pub struct InMemoryQueue<B> {
	state:          Arc<Mutex<QueueState<B>>>,
	max_deliveries: u32,
}

impl<B> InMemoryQueue<B> {
	pub fn new(max_deliveries: u32) -> Self {
		Self {
			state: Arc::new(Mutex::new(QueueState {
				ready:        VecDeque::new(),
				in_flight:    Vec::new(),
				dead_letters: Vec::new(),
			})),
			max_deliveries,
		}
	}

	fn state(&self) -> MutexGuard<'_, QueueState<B>> {
		// A panic while holding the lock cannot leave the deques half-updated.
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	pub fn len(&self) -> usize {
		self.state().ready.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn in_flight_len(&self) -> usize {
		self.state().in_flight.len()
	}
}

impl<B: Clone> InMemoryQueue<B> {
	pub fn pending(&self) -> Vec<Message<B>> {
		self.state().ready.iter().cloned().collect()
	}

	pub fn dead_letters(&self) -> Vec<Message<B>> {
		self.state().dead_letters.clone()
	}
}

impl<B> InMemoryQueue<B> {
	fn take_in_flight(state: &mut QueueState<B>, message: &Message<B>) {
		if let Some(position) = state
			.in_flight
			.iter()
			.position(|m| {
				m.id == message.id && m.delivery_count == message.delivery_count
			}) {
			state.in_flight.remove(position);
		}
	}
}

#[async_trait]
impl<B> Queue<B> for InMemoryQueue<B>
where
	B: Clone + Send + Sync + 'static,
{
	async fn pop(
		&self,
	) -> Result<Option<Message<B>>, Box<dyn std::error::Error + Send>> {
		let mut state = self.state();
		let message = state.ready.pop_back();
		if let Some(message) = &message {
			state.in_flight.push(message.clone());
		}
		Ok(message)
	}

	async fn push(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		self.state().ready.push_front(message);
		Ok(())
	}

	async fn ack(
		&self,
		message: &Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		Self::take_in_flight(&mut self.state(), message);
		Ok(())
	}

	async fn retry(
		&self,
		mut message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		let mut state = self.state();
		Self::take_in_flight(&mut state, &message);
		message.delivery_count += 1;
		if message.delivery_count >= self.max_deliveries {
			state.dead_letters.push(message);
		} else {
			state.ready.push_front(message);
		}
		Ok(())
	}

	async fn dead_letter(
		&self,
		message: Message<B>,
	) -> Result<(), Box<dyn std::error::Error + Send>> {
		let mut state = self.state();
		Self::take_in_flight(&mut state, &message);
		state.dead_letters.push(message);
		Ok(())
	}
}
