use std::{
	fs,
	path::PathBuf,
	sync::Mutex,
	time::{Duration, Instant},
};

const MEMINFO_PATH: &str = "/proc/meminfo";
const SAMPLE_TTL: Duration = Duration::from_secs(1);

/// Reports whether the process should shed tracked records to free memory.
pub trait MemoryPressure
where
	Self: Send + Sync,
{
	fn is_low(&self) -> bool;
}

pub struct NoPressure;
impl MemoryPressure for NoPressure {
	fn is_low(&self) -> bool {
		false
	}
}

/// Compares the kernel's `MemAvailable` estimate against a floor.
///
/// A verdict is reused for one second so eviction loops do not reread the file per record.
pub struct MemInfoPressure {
	source: PathBuf,
	min_available_bytes: u64,
	last: Mutex<Option<(Instant, bool)>>,
}
impl MemInfoPressure {
	pub fn new(min_available_bytes: u64) -> Self {
		Self::with_source(MEMINFO_PATH, min_available_bytes)
	}

	pub fn with_source(source: impl Into<PathBuf>, min_available_bytes: u64) -> Self {
		Self { source: source.into(), min_available_bytes, last: Mutex::new(None) }
	}

	fn sample(&self) -> bool {
		let raw = match fs::read_to_string(&self.source) {
			Ok(raw) => raw,
			Err(err) => {
				tracing::debug!(error = %err, source = ?self.source, "Memory status unavailable.");

				return false;
			},
		};

		match parse_mem_available(&raw) {
			Some(available) => available < self.min_available_bytes,
			None => false,
		}
	}
}
impl MemoryPressure for MemInfoPressure {
	fn is_low(&self) -> bool {
		let now = Instant::now();
		let mut last = self.last.lock().unwrap_or_else(|err| err.into_inner());

		if let Some((sampled_at, verdict)) = *last
			&& now.duration_since(sampled_at) < SAMPLE_TTL
		{
			return verdict;
		}

		let verdict = self.sample();

		if verdict {
			tracing::warn!(
				min_available_bytes = self.min_available_bytes,
				"Available memory below floor; shedding tracked queries."
			);
		}

		*last = Some((now, verdict));

		verdict
	}
}

/// Returns `MemAvailable` in bytes from a `/proc/meminfo` style document.
pub fn parse_mem_available(raw: &str) -> Option<u64> {
	let line = raw.lines().find(|line| line.starts_with("MemAvailable:"))?;
	let mut fields = line["MemAvailable:".len()..].split_whitespace();
	let value: u64 = fields.next()?.parse().ok()?;
	let multiplier = match fields.next() {
		Some(unit) if unit.eq_ignore_ascii_case("kb") => 1_024,
		Some(unit) if unit.eq_ignore_ascii_case("mb") => 1_024 * 1_024,
		Some(_) => return None,
		None => 1,
	};

	value.checked_mul(multiplier)
}
