pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	Validation { message: String },
	#[error("Unauthenticated: {message}")]
	Unauthenticated { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Connectivity error: {message}")]
	Connectivity { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Request was cancelled.")]
	Cancelled,
}
impl From<vicinity_storage::Error> for Error {
	fn from(err: vicinity_storage::Error) -> Self {
		match err {
			vicinity_storage::Error::Sqlx(inner) => from_sqlx(inner),
			vicinity_storage::Error::InvalidArgument(message) => Self::Validation { message },
			vicinity_storage::Error::NotFound(message) => Self::NotFound { message },
			vicinity_storage::Error::Corrupt(message) => Self::Storage { message },
		}
	}
}

impl From<vicinity_providers::Error> for Error {
	fn from(err: vicinity_providers::Error) -> Self {
		use vicinity_providers::Error as ProviderError;

		match err {
			ProviderError::Unauthenticated => Self::Unauthenticated { message: err.to_string() },
			ProviderError::InvalidHeaderName(_)
			| ProviderError::InvalidHeaderValue(_)
			| ProviderError::InvalidConfig { .. } => Self::Validation { message: err.to_string() },
			ProviderError::Reqwest(_)
			| ProviderError::SerdeJson(_)
			| ProviderError::Status { .. }
			| ProviderError::InvalidResponse { .. } => Self::Connectivity { message: err.to_string() },
		}
	}
}

impl From<vicinity_domain::Error> for Error {
	fn from(err: vicinity_domain::Error) -> Self {
		Self::Validation { message: err.to_string() }
	}
}

/// Transport and pool failures are connectivity problems. Anything the database answered with,
/// including rows that do not decode, is a storage problem.
fn from_sqlx(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::Configuration(_)
		| sqlx::Error::Io(_)
		| sqlx::Error::Tls(_)
		| sqlx::Error::Protocol(_)
		| sqlx::Error::PoolTimedOut
		| sqlx::Error::PoolClosed
		| sqlx::Error::WorkerCrashed => Error::Connectivity { message: err.to_string() },
		_ => Error::Storage { message: err.to_string() },
	}
}
