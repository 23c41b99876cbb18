use std::{
	mem,
	path::{Path, PathBuf},
	sync::{Mutex, MutexGuard, OnceLock},
};

use time::{
	Duration, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
	macros::format_description,
};
use tokio::sync::mpsc::{self, error::TrySendError};

use qtrack_domain::QueryRecord;

use crate::{Error, Result};

const LINE_TIMESTAMP: &[BorrowedFormatItem<'static>] =
	format_description!("[year][month][day][hour][minute][second]");

/// A snapshot of archived lines bound for one append to the dump file.
#[derive(Debug)]
pub struct FlushJob {
	pub path: PathBuf,
	pub lines: Vec<String>,
}

/// Buffers archived queries as rendered lines and hands snapshots to the flush worker.
pub struct DumpLog {
	buffer: Mutex<Vec<String>>,
	last_flush: Mutex<OffsetDateTime>,
	flush_interval: Duration,
	target: OnceLock<PathBuf>,
	jobs: Mutex<Option<mpsc::Sender<FlushJob>>>,
}
impl DumpLog {
	/// The returned receiver must be handed to a [`crate::FlushWorker`]; until then jobs queue up
	/// to `queue_capacity`.
	pub fn new(cfg: &qtrack_config::Dump) -> (Self, mpsc::Receiver<FlushJob>) {
		let (sender, receiver) = mpsc::channel(cfg.queue_capacity.max(1));
		let flush_interval = i64::try_from(cfg.flush_interval_seconds)
			.map(Duration::seconds)
			.unwrap_or(Duration::MAX);
		let target = OnceLock::new();

		if let Some(path) = cfg.file.clone() {
			let _ = target.set(path);
		}

		let log = Self {
			buffer: Mutex::new(Vec::new()),
			last_flush: Mutex::new(OffsetDateTime::now_utc()),
			flush_interval,
			target,
			jobs: Mutex::new(Some(sender)),
		};

		(log, receiver)
	}

	/// Sets the append target. Only the first call takes effect.
	pub fn set_dump_file(&self, path: impl Into<PathBuf>) -> Result<()> {
		let path = path.into();

		self.target.set(path).map_err(|_| Error::DumpFileAlreadySet {
			path: self.target.get().cloned().unwrap_or_default(),
		})
	}

	pub fn dump_file(&self) -> Option<&Path> {
		self.target.get().map(PathBuf::as_path)
	}

	pub fn archive(&self, record: &QueryRecord) {
		let count = record.result_count().to_string();

		if let Some(line) = render_line(record.query(), &count, record.started_at()) {
			lock(&self.buffer).push(line);
		}
	}

	/// Archives a query outside the eviction path, stamped with the current time, and flushes
	/// when the flush interval has elapsed.
	pub fn archive_raw(&self, query: &str, result_count: &str) {
		let now = OffsetDateTime::now_utc();
		let Some(line) = render_line(query, result_count, now) else {
			return;
		};

		lock(&self.buffer).push(line);

		if self.claim_scheduled_flush(now) {
			self.flush();
		}
	}

	/// Takes the whole buffer and queues it for the worker without waiting for the write.
	pub fn flush(&self) {
		let lines = mem::take(&mut *lock(&self.buffer));

		if lines.is_empty() {
			return;
		}

		let Some(path) = self.target.get() else {
			tracing::debug!(
				lines = lines.len(),
				"No dump file configured; archived queries discarded."
			);

			return;
		};
		let Some(sender) = lock(&self.jobs).clone() else {
			tracing::warn!(
				lines = lines.len(),
				"Dump flush worker stopped; archived queries dropped."
			);

			return;
		};

		match sender.try_send(FlushJob { path: path.clone(), lines }) {
			Ok(()) => {},
			Err(TrySendError::Full(job)) => {
				tracing::warn!(
					lines = job.lines.len(),
					"Dump flush queue is full; archived queries kept for the next flush."
				);

				self.requeue(job.lines);
			},
			Err(TrySendError::Closed(job)) => {
				tracing::warn!(
					lines = job.lines.len(),
					"Dump flush worker stopped; archived queries dropped."
				);
			},
		}
	}

	pub fn pending(&self) -> usize {
		lock(&self.buffer).len()
	}

	/// Stops accepting flush jobs. The worker exits once it has written every queued job.
	pub fn close(&self) {
		lock(&self.jobs).take();
	}

	fn claim_scheduled_flush(&self, now: OffsetDateTime) -> bool {
		let mut last_flush = lock(&self.last_flush);

		if now - *last_flush <= self.flush_interval {
			return false;
		}

		*last_flush = now;

		true
	}

	fn requeue(&self, mut lines: Vec<String>) {
		let mut buffer = lock(&self.buffer);

		lines.append(&mut buffer);

		*buffer = lines;
	}
}

/// Renders `<yyyyMMddHHmmss> <count> <query>` in UTC. Empty queries render nothing.
pub fn render_line(query: &str, result_count: &str, at: OffsetDateTime) -> Option<String> {
	if query.is_empty() {
		return None;
	}

	let stamp = match at.to_offset(UtcOffset::UTC).format(LINE_TIMESTAMP) {
		Ok(stamp) => stamp,
		Err(err) => {
			tracing::warn!(error = %err, "Failed to format dump timestamp.");

			return None;
		},
	};

	if query.contains(['\n', '\r']) {
		let flattened = query.replace(['\n', '\r'], " ");

		return Some(format!("{stamp} {result_count} {flattened}"));
	}

	Some(format!("{stamp} {result_count} {query}"))
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
