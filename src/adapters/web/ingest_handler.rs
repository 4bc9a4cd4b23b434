use actix_web::{HttpResponse, Responder, ResponseError, web};
use log::{info, warn};
use time::{Duration, OffsetDateTime};

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::schema::{IngestDefaults, IngestRequest, IngestResponse};
use crate::domain::booking::Booking;
use crate::domain::errors::PipelineError;
use crate::domain::platform::PaymentsPlatform;
use crate::domain::queue::Queue;
use crate::domain::schedule::{BookingWindow, format_utc};
use crate::use_cases::ingest_bookings::IngestBookingsUseCase;

/// On-demand booking listing. An empty body or missing bounds fall back to
/// the scheduled window ending now.
pub async fn ingest_bookings<P, Q>(
	body: web::Bytes,
	defaults: web::Data<IngestDefaults>,
	ingest_bookings_use_case: web::Data<IngestBookingsUseCase<P, Q>>,
) -> impl Responder
where
	P: PaymentsPlatform,
	Q: Queue<Booking>,
{
	let request = if body.is_empty() {
		IngestRequest::default()
	} else {
		match serde_json::from_slice::<IngestRequest>(&body) {
			Ok(request) => request,
			Err(e) => {
				warn!("Rejected malformed booking listing request: {e}");
				return ApiError::BadClientDataError.error_response();
			}
		}
	};
	let end = request.end.unwrap_or_else(OffsetDateTime::now_utc);
	let start = request
		.start
		.unwrap_or(end - Duration::days(i64::from(defaults.lookback_days)));

	let window = match BookingWindow::new(start, end) {
		Ok(window) => window,
		Err(e) => {
			warn!("Rejected booking listing request: {e}");
			return ApiError::BadClientDataError.error_response();
		}
	};

	info!(
		"On-demand booking listing between {} and {}",
		format_utc(window.start()),
		format_utc(window.end())
	);

	match ingest_bookings_use_case.execute(window).await {
		Ok(report) => HttpResponse::Accepted().json(IngestResponse {
			start:  format_utc(window.start()),
			end:    format_utc(window.end()),
			listed: report.listed,
			queued: report.queued,
		}),
		Err(PipelineError::Platform { .. }) => {
			ApiError::UpstreamError.error_response()
		}
		Err(e) => {
			warn!("Error listing bookings: {e:?}");
			ApiError::InternalServerError.error_response()
		}
	}
}
