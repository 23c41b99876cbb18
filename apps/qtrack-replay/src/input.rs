use qtrack_domain::{Origin, QueryRecord};

use crate::{Error, Result};

const RAW_ARCHIVE_TAG: &str = "raw";

/// One parsed stdin line.
#[derive(Debug, PartialEq)]
pub enum Entry {
	/// `<local|remote> <result_count> <query...>`, stamped when parsed.
	Track { origin: Origin, record: QueryRecord },
	/// `raw <result_count> <query...>`, archived directly without entering a history store.
	Archive { query: String, result_count: String },
}

/// Parses a replay line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Entry>> {
	let line = line.trim();

	if line.is_empty() || line.starts_with('#') {
		return Ok(None);
	}

	let (tag, rest) = split_field(line);
	let (count, query) = split_field(rest);

	if count.is_empty() {
		return Err(Error::MissingField("result_count"));
	}

	let result_count: u64 = count.parse().map_err(|_| Error::InvalidCount(count.to_string()))?;

	if tag.eq_ignore_ascii_case(RAW_ARCHIVE_TAG) {
		return Ok(Some(Entry::Archive {
			query: query.to_string(),
			result_count: result_count.to_string(),
		}));
	}

	let origin: Origin = tag.parse()?;

	Ok(Some(Entry::Track { origin, record: QueryRecord::now(query, result_count) }))
}

fn split_field(raw: &str) -> (&str, &str) {
	match raw.split_once(char::is_whitespace) {
		Some((head, tail)) => (head, tail.trim_start()),
		None => (raw, ""),
	}
}
