use std::sync::Arc;

use booking_invoicer::run;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let config = Arc::new(
		booking_invoicer::infrastructure::config::settings::Config::load()
			.expect("Failed to load configuration"),
	);
	run(config).await
}
