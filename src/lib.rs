use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use log::{error, info, warn};

use crate::adapters::web::health_handler::health;
use crate::adapters::web::ingest_handler::ingest_bookings;
use crate::adapters::web::schema::IngestDefaults;
use crate::adapters::web::webhook_handler::square_webhook;
use crate::domain::booking::Booking;
use crate::domain::invoice::{BookingInvoice, Invoice};
use crate::domain::queue::{INVOICES_QUEUE_KEY, ORDERS_QUEUE_KEY, PUBLISH_QUEUE_KEY};
use crate::domain::schedule::DailySchedule;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::platform::square_client::SquarePlatform;
use crate::infrastructure::queue::redis_queue::RedisQueue;
use crate::infrastructure::workers::booking_ingestion_worker::{
	RetryPolicy, ScheduledIngestion, booking_ingestion_worker,
};
use crate::infrastructure::workers::stage_worker::stage_worker;
use crate::use_cases::create_invoice::CreateInvoiceUseCase;
use crate::use_cases::create_order::CreateOrderUseCase;
use crate::use_cases::ingest_bookings::IngestBookingsUseCase;
use crate::use_cases::publish_invoice::PublishInvoiceUseCase;

pub mod adapters {
	pub mod web {
		pub mod errors;
		pub mod health_handler;
		pub mod ingest_handler;
		pub mod schema;
		pub mod webhook_handler;
	}
}

pub mod domain {
	pub mod booking;
	pub mod catalog;
	pub mod customer;
	pub mod errors;
	pub mod invoice;
	pub mod order;
	pub mod platform;
	pub mod queue;
	pub mod schedule;
}

pub mod infrastructure {
	pub mod config {
		pub mod redis;
		pub mod settings;
	}
	pub mod platform {
		pub mod square_client;
		pub mod square_schema;
	}
	pub mod queue {
		pub mod in_memory_queue;
		pub mod redis_queue;
	}
	pub mod workers {
		pub mod booking_ingestion_worker;
		pub mod stage_worker;
	}
}

pub mod use_cases {
	pub mod create_invoice;
	pub mod create_order;
	pub mod dto;
	pub mod ingest_bookings;
	pub mod publish_invoice;
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
	std::io::Error::other(e.to_string())
}

async fn recover<B>(queue: &RedisQueue<B>) {
	match queue.recover_in_flight().await {
		Ok(0) => {}
		Ok(recovered) => warn!(
			"Recovered {recovered} unacknowledged messages on '{}'",
			queue.key()
		),
		Err(e) => error!("Failed to recover in-flight messages on '{}': {e}", queue.key()),
	}
}

pub async fn run(config: Arc<Config>) -> std::io::Result<()> {
	let _ = env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or("info"),
	)
	.try_init();

	let redis_client =
		redis::Client::open(config.redis_url.as_str()).map_err(io_error)?;
	let platform = SquarePlatform::from_config(&config).map_err(io_error)?;
	let schedule = DailySchedule::at(config.schedule_hour, config.schedule_minute)
		.map_err(io_error)?;

	let orders_queue = RedisQueue::<Booking>::new(
		redis_client.clone(),
		ORDERS_QUEUE_KEY,
		&config.consumer_name,
		config.max_deliveries,
	);
	let invoices_queue = RedisQueue::<BookingInvoice>::new(
		redis_client.clone(),
		INVOICES_QUEUE_KEY,
		&config.consumer_name,
		config.max_deliveries,
	);
	let publish_queue = RedisQueue::<Invoice>::new(
		redis_client.clone(),
		PUBLISH_QUEUE_KEY,
		&config.consumer_name,
		config.max_deliveries,
	);

	recover(&orders_queue).await;
	recover(&invoices_queue).await;
	recover(&publish_queue).await;

	let ingest_bookings_use_case =
		IngestBookingsUseCase::new(platform.clone(), orders_queue.clone());
	let create_order_use_case =
		CreateOrderUseCase::new(platform.clone(), invoices_queue.clone());
	let create_invoice_use_case =
		CreateInvoiceUseCase::new(platform.clone(), publish_queue.clone());
	let publish_invoice_use_case = PublishInvoiceUseCase::new(platform.clone());

	info!("Starting booking ingestion worker...");
	let retry = RetryPolicy {
		max_attempts:    config.ingest_max_attempts.max(1),
		initial_backoff: Duration::from_secs(config.ingest_backoff_secs),
		max_backoff:     Duration::from_secs(config.ingest_backoff_secs * 16),
	};
	tokio::spawn(booking_ingestion_worker(
		ScheduledIngestion::new(
			ingest_bookings_use_case.clone(),
			config.lookback_days,
			retry,
		),
		schedule,
	));

	info!("Starting pipeline stage workers...");
	tokio::spawn(stage_worker(
		ORDERS_QUEUE_KEY,
		orders_queue,
		create_order_use_case,
	));
	tokio::spawn(stage_worker(
		INVOICES_QUEUE_KEY,
		invoices_queue,
		create_invoice_use_case,
	));
	tokio::spawn(stage_worker(
		PUBLISH_QUEUE_KEY,
		publish_queue,
		publish_invoice_use_case,
	));

	let defaults = IngestDefaults {
		lookback_days: config.lookback_days,
	};

	info!(
		"Starting Actix-Web server on {}:{}...",
		config.server_host, config.server_port
	);
	HttpServer::new(move || {
		App::new()
			.app_data(web::Data::new(ingest_bookings_use_case.clone()))
			.app_data(web::Data::new(defaults))
			.service(health)
			.service(square_webhook)
			.route(
				"/bookings/ingest",
				web::post()
					.to(ingest_bookings::<SquarePlatform, RedisQueue<Booking>>),
			)
	})
	.bind((config.server_host.as_str(), config.server_port))?
	.run()
	.await
}
