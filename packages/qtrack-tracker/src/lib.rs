pub mod dump;
pub mod observer;
pub mod pressure;
pub mod store;
pub mod worker;

mod error;

pub use dump::{DumpLog, FlushJob};
pub use error::{Error, Result};
pub use observer::{LEARN_THRESHOLD, NoopObserver, RecordObserver};
pub use pressure::{MemInfoPressure, MemoryPressure, NoPressure};
pub use store::{HistoryStore, NewestFirst};
pub use worker::FlushWorker;

use std::{
	path::PathBuf,
	sync::{Arc, Mutex},
};

use qtrack_config::Config;
use qtrack_domain::{EvictionPolicy, Origin, QueryRecord};

use crate::dump::lock;

/// Collaborators injected into both history stores.
#[derive(Clone)]
pub struct Hooks {
	pub observer: Arc<dyn RecordObserver>,
	pub pressure: Arc<dyn MemoryPressure>,
}
impl Hooks {
	/// Probes `/proc/meminfo` when `memory.min_available_mb` is non-zero.
	pub fn from_config(cfg: &qtrack_config::Memory, observer: Arc<dyn RecordObserver>) -> Self {
		let pressure: Arc<dyn MemoryPressure> = if cfg.min_available_mb == 0 {
			Arc::new(NoPressure)
		} else {
			Arc::new(MemInfoPressure::new(cfg.min_available_mb.saturating_mul(1_024 * 1_024)))
		};

		Self { observer, pressure }
	}
}
impl Default for Hooks {
	fn default() -> Self {
		Self { observer: Arc::new(NoopObserver), pressure: Arc::new(NoPressure) }
	}
}

/// Query history for both origins plus the shared dump log.
///
/// Construct one per process and share it by reference (or `Arc`) with every producer.
pub struct Tracker {
	local: HistoryStore,
	remote: HistoryStore,
	dump: Arc<DumpLog>,
	worker: Mutex<Option<FlushWorker>>,
}
impl Tracker {
	/// Builds both stores and starts the flush worker. Must be called from within a tokio
	/// runtime.
	pub fn spawn(cfg: &Config, hooks: Hooks) -> Self {
		let policy = EvictionPolicy::from_config(&cfg.history);
		let (dump, jobs) = DumpLog::new(&cfg.dump);
		let dump = Arc::new(dump);
		let worker = FlushWorker::spawn(jobs);
		let store = |origin| {
			HistoryStore::new(
				origin,
				policy,
				hooks.observer.clone(),
				hooks.pressure.clone(),
				dump.clone(),
			)
		};

		tracing::info!(
			max_size = policy.max_size,
			min_size = policy.min_size,
			max_age_seconds = policy.max_age.whole_seconds(),
			dump_file = ?dump.dump_file(),
			"Query tracker started."
		);

		Self {
			local: store(Origin::Local),
			remote: store(Origin::Remote),
			dump,
			worker: Mutex::new(Some(worker)),
		}
	}

	pub fn store(&self, origin: Origin) -> &HistoryStore {
		match origin {
			Origin::Local => &self.local,
			Origin::Remote => &self.remote,
		}
	}

	pub fn add(&self, origin: Origin, record: QueryRecord) {
		self.store(origin).append(record);
	}

	pub fn get(&self, origin: Origin) -> NewestFirst {
		self.store(origin).newest_first()
	}

	pub fn size(&self, origin: Origin) -> usize {
		self.store(origin).size()
	}

	/// Moves the whole local history into the dump log and schedules a flush. Returns the
	/// number of records moved.
	pub fn dump_now(&self) -> usize {
		let drained = self.local.drain_into(&self.dump);

		tracing::info!(drained, "Local query history dumped.");

		self.dump.flush();

		drained
	}

	pub fn archive_raw(&self, query: &str, result_count: &str) {
		self.dump.archive_raw(query, result_count);
	}

	pub fn set_dump_file(&self, path: impl Into<PathBuf>) -> Result<()> {
		self.dump.set_dump_file(path)
	}

	pub fn flush(&self) {
		self.dump.flush();
	}

	pub fn pending_dump_lines(&self) -> usize {
		self.dump.pending()
	}

	pub fn dump_log(&self) -> &DumpLog {
		&self.dump
	}

	/// Closes the flush queue and waits until every queued batch has been written. Lines still
	/// buffered are not flushed; call [`Tracker::flush`] or [`Tracker::dump_now`] first.
	pub async fn shutdown(&self) {
		self.dump.close();

		let worker = lock(&self.worker).take();

		if let Some(worker) = worker {
			worker.join().await;

			tracing::info!("Query tracker stopped.");
		}
	}
}
