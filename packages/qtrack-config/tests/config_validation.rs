use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use qtrack_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let table = root
		.as_table_mut()
		.expect("Template config must be a table.")
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{section}]."));

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("qtrack_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> qtrack_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = qtrack_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config must be valid.");

	assert_eq!(cfg.history.max_size, 1_000);
	assert_eq!(cfg.history.min_size, 100);
	assert_eq!(cfg.history.max_age_seconds, 86_400);
	assert_eq!(cfg.dump.file, Some(PathBuf::from("queries.log")));
	assert_eq!(cfg.dump.flush_interval_seconds, 60);
}

#[test]
fn empty_document_uses_defaults() {
	let cfg = load_payload(String::new()).expect("Empty config must fall back to defaults.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.history.max_size, 1_000);
	assert_eq!(cfg.history.min_size, 100);
	assert_eq!(cfg.history.max_age_seconds, 24 * 60 * 60);
	assert_eq!(cfg.dump.file, None);
	assert_eq!(cfg.dump.flush_interval_seconds, 60);
	assert_eq!(cfg.dump.queue_capacity, 16);
	assert_eq!(cfg.memory.min_available_mb, 0);
}

#[test]
fn blank_dump_file_normalizes_to_unset() {
	let payload = sample_toml_with("dump", "file", Value::String("   ".to_string()));
	let cfg = load_payload(payload).expect("Blank dump file must be accepted.");

	assert_eq!(cfg.dump.file, None);
}

#[test]
fn max_size_must_be_positive() {
	let payload = sample_toml_with("history", "max_size", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected max_size validation error.");

	assert!(
		err.to_string().contains("history.max_size must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn min_size_cannot_exceed_max_size() {
	let payload = sample_toml_with("history", "min_size", Value::Integer(5_000));
	let err = load_payload(payload).expect_err("Expected min_size validation error.");

	assert!(
		matches!(err, Error::Validation { key: "history.min_size", .. }),
		"Unexpected error: {err}"
	);
}

#[test]
fn max_age_must_be_positive() {
	let payload = sample_toml_with("history", "max_age_seconds", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected max_age_seconds validation error.");

	assert!(
		err.to_string().contains("history.max_age_seconds must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn queue_capacity_must_be_positive() {
	let payload = sample_toml_with("dump", "queue_capacity", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected queue_capacity validation error.");

	assert!(
		err.to_string().contains("dump.queue_capacity must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn missing_file_reports_path() {
	let mut path = env::temp_dir();

	path.push("qtrack_config_test_does_not_exist.toml");

	let err = qtrack_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
	let err = load_payload("[history\nmax_size = ".to_string()).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn defaults_validate() {
	qtrack_config::validate(&Config::default()).expect("Default config must validate.");
}
