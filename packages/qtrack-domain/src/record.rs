use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// One executed search query. Records are never mutated after construction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryRecord {
	query: String,
	result_count: u64,
	#[serde(with = "crate::time_serde")]
	started_at: OffsetDateTime,
}
impl QueryRecord {
	pub fn new(query: impl Into<String>, result_count: u64, started_at: OffsetDateTime) -> Self {
		Self { query: query.into(), result_count, started_at }
	}

	pub fn now(query: impl Into<String>, result_count: u64) -> Self {
		Self::new(query, result_count, OffsetDateTime::now_utc())
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn result_count(&self) -> u64 {
		self.result_count
	}

	pub fn started_at(&self) -> OffsetDateTime {
		self.started_at
	}

	/// Negative when the record was stamped in the future relative to `now`.
	pub fn age(&self, now: OffsetDateTime) -> Duration {
		now - self.started_at
	}
}
