use std::path::Path;

use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::mpsc, task::JoinHandle};

use crate::{Error, Result, dump::FlushJob};

/// The single task that appends flush snapshots to the dump file, one job at a time.
pub struct FlushWorker {
	handle: JoinHandle<()>,
}
impl FlushWorker {
	/// Must be called from within a tokio runtime.
	pub fn spawn(jobs: mpsc::Receiver<FlushJob>) -> Self {
		Self { handle: tokio::spawn(run_flush_worker(jobs)) }
	}

	/// Resolves once the job queue is closed and every queued job has been written.
	pub async fn join(self) {
		if let Err(err) = self.handle.await {
			tracing::error!(error = %err, "Dump flush worker terminated abnormally.");
		}
	}
}

pub async fn run_flush_worker(mut jobs: mpsc::Receiver<FlushJob>) {
	while let Some(job) = jobs.recv().await {
		let lines = job.lines.len();

		match append_lines(&job.path, &job.lines).await {
			Ok(()) => {
				tracing::debug!(path = ?job.path, lines, "Dump log flushed.");
			},
			Err(err) => {
				tracing::error!(
					error = %err,
					cause = ?std::error::Error::source(&err),
					path = ?job.path,
					lines,
					"Dump log flush failed; batch dropped."
				);
			},
		}
	}

	tracing::debug!("Dump flush worker stopped.");
}

/// Opens `path` for appending (creating it if missing), writes each line followed by a single
/// `\n`, and closes it.
pub async fn append_lines(path: &Path, lines: &[String]) -> Result<()> {
	let io_err = |source: std::io::Error| Error::WriteDump { path: path.to_path_buf(), source };
	let mut file = OpenOptions::new().create(true).append(true).open(path).await.map_err(io_err)?;
	let mut payload = Vec::with_capacity(lines.iter().map(|line| line.len() + 1).sum());

	for line in lines {
		payload.extend_from_slice(line.as_bytes());
		payload.push(b'\n');
	}

	file.write_all(&payload).await.map_err(io_err)?;
	file.flush().await.map_err(io_err)?;

	Ok(())
}
