use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	pub redis_url:            String,
	pub square_access_token:  String,
	pub square_base_url:      String,
	pub square_api_version:   String,
	pub server_host:          String,
	pub server_port:          u16,
	pub schedule_hour:        u8,
	pub schedule_minute:      u8,
	pub lookback_days:        u32,
	pub max_deliveries:       u32,
	pub request_timeout_secs: u64,
	pub consumer_name:        String,
	pub ingest_max_attempts:  u32,
	pub ingest_backoff_secs:  u64,
}

impl Config {
	pub fn load() -> Result<Self, config::ConfigError> {
		let config_builder = config::Config::builder()
			.set_default("square_base_url", "https://connect.squareup.com")?
			.set_default("square_api_version", "2024-01-18")?
			.set_default("server_host", "0.0.0.0")?
			.set_default("server_port", 8080)?
			.set_default("schedule_hour", 23)?
			.set_default("schedule_minute", 0)?
			.set_default("lookback_days", 1)?
			.set_default("max_deliveries", 5)?
			.set_default("request_timeout_secs", 10)?
			.set_default("consumer_name", "default")?
			.set_default("ingest_max_attempts", 5)?
			.set_default("ingest_backoff_secs", 30)?
			.add_source(config::Environment::with_prefix("APP"))
			.build()?;

		config_builder.try_deserialize()
	}
}
