mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Dump, History, Memory, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::invalid("service.log_level", "must be non-empty."));
	}
	if cfg.history.max_size == 0 {
		return Err(Error::invalid("history.max_size", "must be greater than zero."));
	}
	if cfg.history.min_size > cfg.history.max_size {
		return Err(Error::invalid(
			"history.min_size",
			"must be less than or equal to history.max_size.",
		));
	}
	if cfg.history.max_age_seconds == 0 {
		return Err(Error::invalid("history.max_age_seconds", "must be greater than zero."));
	}
	if i64::try_from(cfg.history.max_age_seconds).is_err() {
		return Err(Error::invalid("history.max_age_seconds", "exceeds the supported range."));
	}
	if i64::try_from(cfg.dump.flush_interval_seconds).is_err() {
		return Err(Error::invalid("dump.flush_interval_seconds", "exceeds the supported range."));
	}
	if cfg.dump.queue_capacity == 0 {
		return Err(Error::invalid("dump.queue_capacity", "must be greater than zero."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.dump
		.file
		.as_deref()
		.map(|file| file.to_string_lossy().trim().is_empty())
		.unwrap_or(false)
	{
		cfg.dump.file = None;
	}

	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
