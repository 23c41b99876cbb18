use std::{
	collections::VecDeque,
	iter::{FusedIterator, Rev},
	sync::{Arc, Mutex},
	vec,
};

use time::OffsetDateTime;

use qtrack_domain::{EvictionPolicy, Origin, QueryRecord};

use crate::{
	DumpLog, MemoryPressure, RecordObserver,
	dump::lock,
	observer::learning_signal,
};

/// Recent queries of one origin, oldest at the front.
pub struct HistoryStore {
	origin: Origin,
	policy: EvictionPolicy,
	records: Mutex<VecDeque<QueryRecord>>,
	observer: Arc<dyn RecordObserver>,
	pressure: Arc<dyn MemoryPressure>,
	dump: Arc<DumpLog>,
}
impl HistoryStore {
	pub fn new(
		origin: Origin,
		policy: EvictionPolicy,
		observer: Arc<dyn RecordObserver>,
		pressure: Arc<dyn MemoryPressure>,
		dump: Arc<DumpLog>,
	) -> Self {
		Self { origin, policy, records: Mutex::new(VecDeque::new()), observer, pressure, dump }
	}

	pub fn origin(&self) -> Origin {
		self.origin
	}

	/// Appends `record` and evicts until the policy holds. Evicted records reach the dump buffer
	/// before the store lock is released. Returns the number of evicted records.
	pub fn append(&self, record: QueryRecord) -> usize {
		if let Some(signal) = learning_signal(&record) {
			self.observer.observe(&signal);
		}

		let now = OffsetDateTime::now_utc();
		let mut records = lock(&self.records);

		records.push_back(record);

		let evicted = self.policy.apply(
			&mut records,
			now,
			|| self.pressure.is_low(),
			|evicted| self.dump.archive(&evicted),
		);

		if evicted > 0 {
			tracing::trace!(
				origin = %self.origin,
				evicted,
				size = records.len(),
				"History store evicted records."
			);
		}

		evicted
	}

	pub fn size(&self) -> usize {
		lock(&self.records).len()
	}

	/// Snapshot of the current records, newest first. Later appends do not affect it.
	pub fn newest_first(&self) -> NewestFirst {
		let snapshot: Vec<QueryRecord> = lock(&self.records).iter().cloned().collect();

		NewestFirst { inner: snapshot.into_iter().rev() }
	}

	/// Moves every record into the dump buffer, oldest first. Returns how many were moved.
	pub fn drain_into(&self, dump: &DumpLog) -> usize {
		let mut records = lock(&self.records);
		let drained = records.len();

		for record in records.drain(..) {
			dump.archive(&record);
		}

		drained
	}
}

/// Owned, newest-first iterator over a history snapshot.
#[derive(Debug)]
pub struct NewestFirst {
	inner: Rev<vec::IntoIter<QueryRecord>>,
}
impl Iterator for NewestFirst {
	type Item = QueryRecord;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}
impl DoubleEndedIterator for NewestFirst {
	fn next_back(&mut self) -> Option<Self::Item> {
		self.inner.next_back()
	}
}
impl ExactSizeIterator for NewestFirst {}
impl FusedIterator for NewestFirst {}
