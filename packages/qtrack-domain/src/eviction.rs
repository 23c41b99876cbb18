use std::collections::VecDeque;

use time::{Duration, OffsetDateTime};

use crate::QueryRecord;

/// Capacity, memory-pressure and staleness bounds for a history store.
///
/// Records are always evicted from the front of the queue, so a store kept in insertion order
/// stays in chronological order and the evicted stream is oldest-first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EvictionPolicy {
	pub max_size: usize,
	pub min_size: usize,
	pub max_age: Duration,
}
impl EvictionPolicy {
	pub fn from_config(cfg: &qtrack_config::History) -> Self {
		let max_age =
			i64::try_from(cfg.max_age_seconds).map(Duration::seconds).unwrap_or(Duration::MAX);

		Self { max_size: cfg.max_size, min_size: cfg.min_size, max_age }
	}

	pub fn is_stale(&self, record: &QueryRecord, now: OffsetDateTime) -> bool {
		record.age(now) > self.max_age
	}

	/// Evicts from the head of `records` until every bound holds, handing each evicted record to
	/// `evict` in eviction order. Returns how many records were evicted.
	///
	/// `is_memory_low` is sampled again before every capacity-step eviction, so sustained pressure
	/// can empty the queue.
	pub fn apply<P, E>(
		&self,
		records: &mut VecDeque<QueryRecord>,
		now: OffsetDateTime,
		mut is_memory_low: P,
		mut evict: E,
	) -> usize
	where
		P: FnMut() -> bool,
		E: FnMut(QueryRecord),
	{
		let mut evicted = 0;

		while records.len() > self.max_size || (!records.is_empty() && is_memory_low()) {
			let Some(head) = records.pop_front() else {
				break;
			};

			evict(head);

			evicted += 1;
		}

		if records.len() <= self.min_size {
			return evicted;
		}

		while records.front().map(|head| self.is_stale(head, now)).unwrap_or(false) {
			let Some(head) = records.pop_front() else {
				break;
			};

			evict(head);

			evicted += 1;
		}

		evicted
	}
}
impl Default for EvictionPolicy {
	fn default() -> Self {
		Self::from_config(&qtrack_config::History::default())
	}
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;

	use time::{Duration, OffsetDateTime, macros::datetime};

	use crate::{EvictionPolicy, QueryRecord};

	const NOW: OffsetDateTime = datetime!(2024-05-01 12:00:00 UTC);

	fn record(query: &str, minutes_ago: i64) -> QueryRecord {
		QueryRecord::new(query, 1, NOW - Duration::minutes(minutes_ago))
	}

	fn queries(records: &VecDeque<QueryRecord>) -> Vec<&str> {
		records.iter().map(QueryRecord::query).collect()
	}

	#[test]
	fn default_matches_documented_bounds() {
		let policy = EvictionPolicy::default();

		assert_eq!(policy.max_size, 1_000);
		assert_eq!(policy.min_size, 100);
		assert_eq!(policy.max_age, Duration::hours(24));
	}

	#[test]
	fn capacity_evicts_oldest_first() {
		let policy = EvictionPolicy { max_size: 3, min_size: 1, max_age: Duration::MAX };
		let mut records: VecDeque<_> =
			["a", "b", "c", "d", "e"].iter().map(|query| record(query, 0)).collect();
		let mut evicted = Vec::new();
		let count = policy.apply(&mut records, NOW, || false, |r| evicted.push(r));

		assert_eq!(count, 2);
		assert_eq!(queries(&records), vec!["c", "d", "e"]);
		assert_eq!(evicted.iter().map(QueryRecord::query).collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[test]
	fn small_store_keeps_stale_records() {
		let policy = EvictionPolicy { max_size: 10, min_size: 3, max_age: Duration::hours(1) };
		let mut records: VecDeque<_> =
			vec![record("old", 600), record("older", 300), record("new", 0)].into();
		let count = policy.apply(&mut records, NOW, || false, |_| {});

		assert_eq!(count, 0);
		assert_eq!(records.len(), 3);
	}

	#[test]
	fn large_store_sheds_stale_head() {
		let policy = EvictionPolicy { max_size: 10, min_size: 1, max_age: Duration::hours(1) };
		let mut records: VecDeque<_> =
			vec![record("a", 180), record("b", 120), record("c", 30), record("d", 0)].into();
		let mut evicted = Vec::new();

		policy.apply(&mut records, NOW, || false, |r| evicted.push(r.query().to_string()));

		assert_eq!(evicted, vec!["a", "b"]);
		assert_eq!(queries(&records), vec!["c", "d"]);
	}

	#[test]
	fn age_eviction_can_go_below_min_size() {
		let policy = EvictionPolicy { max_size: 10, min_size: 2, max_age: Duration::hours(1) };
		let mut records: VecDeque<_> =
			vec![record("a", 300), record("b", 240), record("c", 180)].into();

		policy.apply(&mut records, NOW, || false, |_| {});

		assert!(records.is_empty());
	}

	#[test]
	fn age_eviction_stops_at_first_fresh_record() {
		let policy = EvictionPolicy { max_size: 10, min_size: 0, max_age: Duration::hours(1) };
		let mut records: VecDeque<_> =
			vec![record("stale", 120), record("fresh", 5), record("late", 500)].into();

		policy.apply(&mut records, NOW, || false, |_| {});

		assert_eq!(queries(&records), vec!["fresh", "late"]);
	}

	#[test]
	fn record_exactly_at_max_age_is_kept() {
		let policy = EvictionPolicy { max_size: 10, min_size: 0, max_age: Duration::hours(1) };
		let mut records: VecDeque<_> = vec![record("edge", 60)].into();

		policy.apply(&mut records, NOW, || false, |_| {});

		assert_eq!(records.len(), 1);
	}

	#[test]
	fn sustained_pressure_empties_store() {
		let policy = EvictionPolicy { max_size: 10, min_size: 1, max_age: Duration::MAX };
		let mut records: VecDeque<_> = (0..5).map(|i| record(&i.to_string(), 0)).collect();
		let count = policy.apply(&mut records, NOW, || true, |_| {});

		assert_eq!(count, 5);
		assert!(records.is_empty());
	}

	#[test]
	fn transient_pressure_evicts_until_relieved() {
		let policy = EvictionPolicy { max_size: 10, min_size: 1, max_age: Duration::MAX };
		let mut records: VecDeque<_> = (0..5).map(|i| record(&i.to_string(), 0)).collect();
		let mut samples = 0;
		let count = policy.apply(
			&mut records,
			NOW,
			|| {
				samples += 1;

				samples <= 2
			},
			|_| {},
		);

		assert_eq!(count, 2);
		assert_eq!(queries(&records), vec!["2", "3", "4"]);
	}

	#[test]
	fn bounds_hold_after_every_append() {
		let policy = EvictionPolicy { max_size: 5, min_size: 2, max_age: Duration::minutes(30) };
		let mut records = VecDeque::new();

		for minutes_ago in (0..40).rev() {
			records.push_back(record(&minutes_ago.to_string(), minutes_ago));
			policy.apply(&mut records, NOW, || false, |_| {});

			assert!(records.len() <= policy.max_size);

			if records.len() > policy.min_size {
				assert!(records.iter().all(|r| !policy.is_stale(r, NOW)));
			}
		}
	}
}
