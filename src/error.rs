//! Client-level error types shared by the executor, the refresh coordinator, and token stores.
//!
//! Every failure, whatever its origin, exposes the same shape: a non-empty
//! [`Error::message`] plus an optional [`ErrorResponse`] carrying the HTTP status and the
//! parsed body. Callers branch on [`Error::status`] to tell validation failures from auth or
//! server failures.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP status and parsed body attached to errors that reached the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// HTTP status code returned by the server.
	pub status: u16,
	/// Parsed JSON body; an empty object when the body was not JSON.
	pub data: Value,
}

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, connection reset).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The call did not complete before its timeout elapsed.
	#[error("Request timed out after {}ms.", timeout.as_millis())]
	Timeout {
		/// Timeout that was configured for the call.
		timeout: Duration,
	},
	/// Credential refresh failed; the session has been logged out.
	#[error("Authentication failed: {reason}.")]
	AuthenticationFailed {
		/// Why the refresh could not produce new credentials.
		reason: RefreshError,
	},
	/// Server answered with a non-2xx status.
	#[error("{message}")]
	Http {
		/// Server-provided message, the status text, or a generic fallback.
		message: String,
		/// Status and parsed body of the failed response.
		response: ErrorResponse,
	},
	/// Response body could not be parsed or decoded into the requested type.
	#[error("Response body could not be decoded: {source}.")]
	Decode {
		/// Status of the response whose body failed to decode; `data` is `null`.
		response: ErrorResponse,
		/// Structured decoding failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Human-readable message; never empty.
	pub fn message(&self) -> String {
		self.to_string()
	}

	/// Status and body of the response that caused the failure, when one was received.
	pub fn response(&self) -> Option<&ErrorResponse> {
		match self {
			Self::Http { response, .. } | Self::Decode { response, .. } => Some(response),
			_ => None,
		}
	}

	/// HTTP status of the failed response, when one was received.
	pub fn status(&self) -> Option<u16> {
		self.response().map(|response| response.status)
	}

	/// Returns `true` when the call was cancelled by its timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}

	/// Returns `true` when credential refresh failed and the session was logged out.
	pub fn is_authentication_failure(&self) -> bool {
		matches!(self, Self::AuthenticationFailed { .. })
	}

	pub(crate) fn decode(status: u16, source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Decode { response: ErrorResponse { status, data: Value::Null }, source }
	}
}

/// Reasons a credential refresh can fail.
///
/// The value is shared by every request waiting on the same refresh, so it is cheap to clone
/// and carries rendered messages instead of source errors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// No refresh token is stored.
	#[error("no refresh token is available")]
	MissingRefreshToken,
	/// Refresh endpoint answered with a non-2xx status.
	#[error("refresh endpoint rejected the token with status {status}")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
	},
	/// Refresh endpoint returned a body that is not a JSON object.
	#[error("refresh endpoint returned a malformed body: {message}")]
	MalformedResponse {
		/// Parser message.
		message: String,
	},
	/// Refresh endpoint returned JSON without a new access token.
	#[error("refresh response is missing the access token")]
	MissingAccessToken,
	/// Refresh call failed before a response arrived (timeout, network).
	#[error("refresh request failed: {message}")]
	Request {
		/// Rendered transport or timeout error.
		message: String,
	},
	/// Token store failed while reading or persisting credentials.
	#[error("token store failed: {message}")]
	Store {
		/// Rendered store error.
		message: String,
	},
}

/// Configuration and request construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http or https.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Endpoint URL cannot be built from the base URL and the request path.
	#[error("Endpoint `{path}` is invalid.")]
	InvalidEndpoint {
		/// Request path that failed to resolve.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configured route must start with `/`.
	#[error("The {name} path must start with '/': {path}.")]
	InvalidPath {
		/// Which configured path failed validation.
		name: &'static str,
		/// Offending path.
		path: String,
	},
	/// Default timeout must be positive.
	#[error("The default timeout must be greater than zero.")]
	ZeroTimeout,
	/// Required environment variable is not set.
	#[error("Environment variable `{key}` is not set.")]
	MissingEnv {
		/// Variable name.
		key: &'static str,
	},
	/// Environment variable holds an unusable value.
	#[error("Environment variable `{key}` has an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		key: &'static str,
		/// Offending value.
		value: String,
	},
	/// Header name supplied by the caller is invalid.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Header value supplied by the caller is invalid.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeaderValue {
		/// Header whose value was rejected.
		name: String,
	},
	/// Request body or query could not be serialized to JSON.
	#[error("Request payload could not be serialized.")]
	Serialize(#[source] serde_json::Error),
	/// Query parameters did not serialize to a map.
	#[error("Query parameters must serialize to a map, got {found}.")]
	InvalidQuery {
		/// JSON kind that was produced instead.
		found: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network request failed: {source}.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn timeout_message_names_duration() {
		let err = Error::Timeout { timeout: Duration::from_millis(10) };

		assert_eq!(err.message(), "Request timed out after 10ms.");
		assert!(err.response().is_none());
		assert!(err.is_timeout());
	}

	#[test]
	fn http_error_exposes_response() {
		let err = Error::Http {
			message: "x".into(),
			response: ErrorResponse { status: 500, data: serde_json::json!({ "message": "x" }) },
		};

		assert_eq!(err.message(), "x");
		assert_eq!(err.status(), Some(500));
		assert_eq!(
			err.response().and_then(|response| response.data.get("message")),
			Some(&Value::from("x"))
		);
	}

	#[test]
	fn authentication_failure_message_is_prefixed() {
		let err = Error::AuthenticationFailed { reason: RefreshError::Rejected { status: 401 } };

		assert!(err.is_authentication_failure());
		assert_eq!(
			err.message(),
			"Authentication failed: refresh endpoint rejected the token with status 401."
		);
		assert!(err.response().is_none());
	}

	#[test]
	fn decode_error_carries_status_and_path() {
		let decoded: std::result::Result<u32, _> =
			serde_path_to_error::deserialize(serde_json::json!({ "id": 1 }));
		let source = decoded.expect_err("An object must not decode into an integer.");
		let err = Error::decode(200, source);

		assert_eq!(err.status(), Some(200));
		assert_eq!(err.response().map(|response| &response.data), Some(&Value::Null));
		assert!(err.message().starts_with("Response body could not be decoded"));
	}

	#[test]
	fn transport_error_keeps_underlying_message() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
		let err: Error = TransportError::network(io).into();

		assert_eq!(err.message(), "Network request failed: connection refused.");
		assert!(err.response().is_none());
		assert!(StdError::source(&err).is_some());
	}
}
