pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid origin {0:?}; expected local or remote.")]
	InvalidOrigin(String),
}
