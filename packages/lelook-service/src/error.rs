pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Unavailable: {message}")]
	Unavailable { message: String },
}
impl From<lelook_providers::Error> for Error {
	fn from(err: lelook_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
impl From<lelook_storage::Error> for Error {
	fn from(err: lelook_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
