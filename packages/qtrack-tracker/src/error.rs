pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Dump file is already set to {path:?}.")]
	DumpFileAlreadySet { path: std::path::PathBuf },
	#[error("Failed to write dump file at {path:?}.")]
	WriteDump { path: std::path::PathBuf, source: std::io::Error },
}
