use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether a query was answered for this node or on behalf of a remote peer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
	Local,
	Remote,
}
impl Origin {
	pub const ALL: [Origin; 2] = [Origin::Local, Origin::Remote];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Remote => "remote",
		}
	}
}
impl fmt::Display for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Origin {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let trimmed = raw.trim();

		if trimmed.eq_ignore_ascii_case("local") {
			return Ok(Self::Local);
		}
		if trimmed.eq_ignore_ascii_case("remote") {
			return Ok(Self::Remote);
		}

		Err(Error::InvalidOrigin(raw.to_string()))
	}
}
