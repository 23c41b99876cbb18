pub mod input;

mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use time::format_description::well_known::Rfc3339;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use qtrack_domain::Origin;
use qtrack_tracker::{Hooks, RecordObserver, Tracker};

use crate::input::Entry;

#[derive(Debug, Parser)]
#[command(
	version = qtrack_cli::VERSION,
	rename_all = "kebab",
	styles = qtrack_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Overrides `dump.file` from the config.
	#[arg(long, value_name = "FILE")]
	pub dump_file: Option<PathBuf>,
	/// Number of newest local queries printed before exiting.
	#[arg(long, value_name = "N", default_value_t = 10)]
	pub show: usize,
}

/// Logs every learning signal instead of feeding a completion dictionary.
pub struct LoggingObserver;
impl RecordObserver for LoggingObserver {
	fn observe(&self, signal: &str) {
		tracing::debug!(signal, "Completion candidate observed.");
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let mut config = qtrack_config::load(&args.config)?;

	qtrack_cli::init_tracing(&config.service.log_level);

	if let Some(path) = args.dump_file {
		config.dump.file = Some(path);
	}

	let hooks = Hooks::from_config(&config.memory, Arc::new(LoggingObserver));
	let tracker = Tracker::spawn(&config, hooks);
	let stdin = BufReader::new(tokio::io::stdin());

	tokio::select! {
		result = replay(&tracker, stdin) => {
			let tracked = result?;

			tracing::info!(tracked, "Replay input exhausted.");
		},
		signal = tokio::signal::ctrl_c() => {
			signal?;

			tracing::info!("Interrupted; dumping query history.");
		},
	}

	for origin in Origin::ALL {
		tracing::info!(%origin, size = tracker.size(origin), "Query history size.");
	}

	print_newest(&tracker, args.show)?;

	tracker.dump_now();
	tracker.shutdown().await;

	Ok(())
}

/// Feeds every line of `reader` into `tracker`. Malformed lines are logged and skipped.
/// Returns the number of lines that produced an entry.
pub async fn replay<R>(tracker: &Tracker, reader: R) -> std::io::Result<usize>
where
	R: AsyncBufRead + Unpin,
{
	let mut lines = reader.lines();
	let mut line_no = 0_usize;
	let mut tracked = 0_usize;

	while let Some(line) = lines.next_line().await? {
		line_no += 1;

		match input::parse_line(&line) {
			Ok(Some(Entry::Track { origin, record })) => {
				tracker.add(origin, record);

				tracked += 1;
			},
			Ok(Some(Entry::Archive { query, result_count })) => {
				tracker.archive_raw(&query, &result_count);

				tracked += 1;
			},
			Ok(None) => {},
			Err(err) => {
				tracing::warn!(error = %err, line = line_no, "Skipping malformed replay line.");
			},
		}
	}

	Ok(tracked)
}

fn print_newest(tracker: &Tracker, limit: usize) -> color_eyre::Result<()> {
	for record in tracker.get(Origin::Local).take(limit) {
		let started_at = record.started_at().format(&Rfc3339)?;

		println!("{started_at}\t{}\t{}", record.result_count(), record.query());
	}

	Ok(())
}
