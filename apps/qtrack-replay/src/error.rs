pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Missing {0} field.")]
	MissingField(&'static str),
	#[error("Invalid result count {0:?}.")]
	InvalidCount(String),
	#[error(transparent)]
	Origin(#[from] qtrack_domain::Error),
}
