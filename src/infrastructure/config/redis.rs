pub const PROCESSING_SUFFIX: &str = "processing";
pub const DEAD_LETTER_SUFFIX: &str = "dead";

/// In-flight list owned by one consumer, so a restarting instance only
/// reclaims what it had popped itself.
pub fn processing_key(queue_key: &str, consumer: &str) -> String {
	format!("{queue_key}:{PROCESSING_SUFFIX}:{consumer}")
}

pub fn dead_letter_key(queue_key: &str) -> String {
	format!("{queue_key}:{DEAD_LETTER_SUFFIX}")
}
