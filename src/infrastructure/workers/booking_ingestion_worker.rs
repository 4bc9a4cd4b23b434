use std::time::Duration;

use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::time::sleep;

use crate::domain::booking::Booking;
use crate::domain::errors::PipelineError;
use crate::domain::platform::PaymentsPlatform;
use crate::domain::queue::Queue;
use crate::domain::schedule::{BookingWindow, DailySchedule, format_utc};
use crate::use_cases::dto::IngestionReport;
use crate::use_cases::ingest_bookings::IngestBookingsUseCase;

/// Attempts per scheduled run, with the delay doubling up to `max_backoff`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	pub max_attempts:    u32,
	pub initial_backoff: Duration,
	pub max_backoff:     Duration,
}

/// Scheduled booking listing over the trailing `lookback_days`. A window
/// that could not be listed is folded into the next run, so no booking
/// start time is skipped.
pub struct ScheduledIngestion<P: PaymentsPlatform, Q: Queue<Booking>> {
	use_case:      IngestBookingsUseCase<P, Q>,
	lookback_days: u32,
	retry:         RetryPolicy,
	pending_start: Option<OffsetDateTime>,
}

impl<P: PaymentsPlatform, Q: Queue<Booking>> ScheduledIngestion<P, Q> {
	pub fn new(
		use_case: IngestBookingsUseCase<P, Q>,
		lookback_days: u32,
		retry: RetryPolicy,
	) -> Self {
		Self {
			use_case,
			lookback_days,
			retry,
			pending_start: None,
		}
	}

	/// Start of the oldest window not yet listed successfully.
	pub fn pending_start(&self) -> Option<OffsetDateTime> {
		self.pending_start
	}

	pub async fn run_at(
		&mut self,
		now: OffsetDateTime,
	) -> Result<IngestionReport, PipelineError> {
		let trailing = BookingWindow::trailing(now, self.lookback_days)?;
		let window = match self.pending_start {
			Some(start) if start < trailing.start() => BookingWindow::new(start, now)?,
			_ => trailing,
		};

		match self.run_with_retry(window).await {
			Ok(report) => {
				self.pending_start = None;
				Ok(report)
			}
			Err(e) => {
				self.pending_start = Some(window.start());
				Err(e)
			}
		}
	}

	async fn run_with_retry(
		&self,
		window: BookingWindow,
	) -> Result<IngestionReport, PipelineError> {
		let mut backoff = self.retry.initial_backoff;
		let mut attempt = 1;
		loop {
			match self.use_case.execute(window).await {
				Ok(report) => return Ok(report),
				Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
					warn!(
						"Booking listing between {} and {} failed (attempt {attempt}), \
						 retrying in {backoff:?}: {e}",
						format_utc(window.start()),
						format_utc(window.end())
					);
					sleep(backoff).await;
					backoff = (backoff * 2).min(self.retry.max_backoff);
					attempt += 1;
				}
				Err(e) => return Err(e),
			}
		}
	}
}

/// Runs the booking listing once a day at `schedule`.
pub async fn booking_ingestion_worker<P, Q>(
	mut ingestion: ScheduledIngestion<P, Q>,
	schedule: DailySchedule,
) where
	P: PaymentsPlatform,
	Q: Queue<Booking>,
{
	loop {
		let now = OffsetDateTime::now_utc();
		let next_run = schedule.next_after(now);
		info!("Next booking listing at {}", format_utc(next_run));
		sleep((next_run - now).unsigned_abs()).await;

		match ingestion.run_at(OffsetDateTime::now_utc()).await {
			Ok(report) => info!(
				"Scheduled booking listing queued {} of {} appointments",
				report.queued, report.listed
			),
			Err(e) => error!(
				"Scheduled booking listing failed, window from {} carried over: {e}",
				ingestion
					.pending_start()
					.map(format_utc)
					.unwrap_or_else(|| "<unknown>".to_string())
			),
		}
	}
}
