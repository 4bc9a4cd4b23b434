use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, Time, UtcOffset};

use crate::domain::errors::PipelineError;

/// Half-open `[start, end)` window of booking start times, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
	start: OffsetDateTime,
	end:   OffsetDateTime,
}

impl BookingWindow {
	pub fn new(
		start: OffsetDateTime,
		end: OffsetDateTime,
	) -> Result<Self, PipelineError> {
		let start = start.to_offset(UtcOffset::UTC);
		let end = end.to_offset(UtcOffset::UTC);
		if start >= end {
			return Err(PipelineError::InvalidWindow {
				start: format_utc(start),
				end:   format_utc(end),
			});
		}
		Ok(Self { start, end })
	}

	/// The `days` days leading up to `now`.
	pub fn trailing(now: OffsetDateTime, days: u32) -> Result<Self, PipelineError> {
		Self::new(now - Duration::days(i64::from(days)), now)
	}

	pub fn start(&self) -> OffsetDateTime {
		self.start
	}

	pub fn end(&self) -> OffsetDateTime {
		self.end
	}
}

pub fn format_utc(timestamp: OffsetDateTime) -> String {
	timestamp
		.to_offset(UtcOffset::UTC)
		.format(&Rfc3339)
		.unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}

/// Fixed UTC time of day at which the booking listing runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
	at: Time,
}

impl DailySchedule {
	pub fn at(hour: u8, minute: u8) -> Result<Self, time::error::ComponentRange> {
		Ok(Self {
			at: Time::from_hms(hour, minute, 0)?,
		})
	}

	/// First firing strictly after `now`.
	pub fn next_after(&self, now: OffsetDateTime) -> OffsetDateTime {
		let now = now.to_offset(UtcOffset::UTC);
		let today = now.replace_time(self.at);
		if today > now {
			today
		} else {
			today + Duration::days(1)
		}
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn test_window_rejects_inverted_and_empty_ranges() {
		let now = datetime!(2024-03-01 23:00 UTC);

		assert!(matches!(
			BookingWindow::new(now, now),
			Err(PipelineError::InvalidWindow { .. })
		));
		assert!(BookingWindow::new(now, now - Duration::hours(1)).is_err());
	}

	#[test]
	fn test_trailing_window_covers_lookback_days_up_to_now() {
		let now = datetime!(2024-03-01 23:00 UTC);

		let window = BookingWindow::trailing(now, 1).unwrap();

		assert_eq!(window.start(), datetime!(2024-02-29 23:00 UTC));
		assert_eq!(window.end(), now);
	}

	#[test]
	fn test_window_normalises_to_utc() {
		let window = BookingWindow::new(
			datetime!(2024-03-01 10:00 +02:00),
			datetime!(2024-03-02 10:00 +02:00),
		)
		.unwrap();

		assert_eq!(format_utc(window.start()), "2024-03-01T08:00:00Z");
		assert_eq!(window.end().offset(), UtcOffset::UTC);
	}

	#[test]
	fn test_next_after_fires_later_the_same_day() {
		let schedule = DailySchedule::at(23, 0).unwrap();

		assert_eq!(
			schedule.next_after(datetime!(2024-03-01 08:15 UTC)),
			datetime!(2024-03-01 23:00 UTC)
		);
	}

	#[test]
	fn test_next_after_rolls_over_to_tomorrow() {
		let schedule = DailySchedule::at(23, 0).unwrap();

		assert_eq!(
			schedule.next_after(datetime!(2024-03-01 23:00 UTC)),
			datetime!(2024-03-02 23:00 UTC)
		);
		assert_eq!(
			schedule.next_after(datetime!(2024-03-01 23:30 UTC)),
			datetime!(2024-03-02 23:00 UTC)
		);
	}

	#[test]
	fn test_schedule_rejects_invalid_time_of_day() {
		assert!(DailySchedule::at(24, 0).is_err());
		assert!(DailySchedule::at(12, 60).is_err());
	}
}
