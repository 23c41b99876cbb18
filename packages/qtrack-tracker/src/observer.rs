use qtrack_domain::QueryRecord;

/// Records with more results than this feed the completion learner.
pub const LEARN_THRESHOLD: u64 = 10;

/// Receives learning signals from high-yield queries as they are tracked.
///
/// Called synchronously on the producer thread, outside any store lock.
pub trait RecordObserver
where
	Self: Send + Sync,
{
	fn observe(&self, signal: &str);
}

pub struct NoopObserver;
impl RecordObserver for NoopObserver {
	fn observe(&self, _signal: &str) {}
}

/// The learner is fed the query text repeated twice.
pub fn learning_signal(record: &QueryRecord) -> Option<String> {
	let query = record.query();

	if record.result_count() <= LEARN_THRESHOLD || query.is_empty() {
		return None;
	}

	let mut signal = String::with_capacity(query.len() * 2);

	signal.push_str(query);
	signal.push_str(query);

	Some(signal)
}
