use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub history: History,
	#[serde(default)]
	pub dump: Dump,
	#[serde(default)]
	pub memory: Memory,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: default_log_level() }
	}
}

/// Bounds shared by the local and remote history stores.
#[derive(Clone, Debug, Deserialize)]
pub struct History {
	/// Hard capacity. A store never holds more records than this once an append returns.
	#[serde(default = "default_max_size")]
	pub max_size: usize,
	/// Age-based eviction only runs while a store holds more records than this.
	#[serde(default = "default_min_size")]
	pub min_size: usize,
	#[serde(default = "default_max_age_seconds")]
	pub max_age_seconds: u64,
}
impl Default for History {
	fn default() -> Self {
		Self {
			max_size: default_max_size(),
			min_size: default_min_size(),
			max_age_seconds: default_max_age_seconds(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Dump {
	/// Append-only archive target. Unset means flushed batches are discarded.
	#[serde(default)]
	pub file: Option<PathBuf>,
	#[serde(default = "default_flush_interval_seconds")]
	pub flush_interval_seconds: u64,
	#[serde(default = "default_queue_capacity")]
	pub queue_capacity: usize,
}
impl Default for Dump {
	fn default() -> Self {
		Self {
			file: None,
			flush_interval_seconds: default_flush_interval_seconds(),
			queue_capacity: default_queue_capacity(),
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Memory {
	/// Available-memory floor in MiB below which stores shed records. Zero disables probing.
	#[serde(default)]
	pub min_available_mb: u64,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_size() -> usize {
	1_000
}

fn default_min_size() -> usize {
	100
}

fn default_max_age_seconds() -> u64 {
	24 * 60 * 60
}

fn default_flush_interval_seconds() -> u64 {
	60
}

fn default_queue_capacity() -> usize {
	16
}
