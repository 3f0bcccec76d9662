//! Transport primitives for the authenticated client.
//!
//! The module exposes [`HttpTransport`] alongside [`TransportErrorMapper`] so downstream
//! crates can plug in custom HTTP stacks (or scripted fakes in tests) without touching the
//! executor. Requests and responses are plain [`http`](::http) values with buffered bodies;
//! the executor owns header assembly, timeouts, and the refresh protocol, so a transport only
//! has to move bytes.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Buffered request handed to an [`HttpTransport`].
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Buffered response returned by an [`HttpTransport`].
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::call`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing one request.
///
/// Implementations must be `Send + Sync + 'static` so the client can share them across tasks
/// and hand them to the refresh flight, which outlives the request that started it. The
/// returned future is dropped when the request's timeout fires; transports must tolerate that
/// cancellation.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and buffers the full response body.
	fn call(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Maps transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an error emitted by the transport into a client error.
	fn map_transport_error(&self, error: E) -> Error;
}

/// Mapper that reports every transport failure as [`TransportError::Network`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkErrorMapper;
impl<E> TransportErrorMapper<E> for NetworkErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, error: E) -> Error {
		TransportError::network(error).into()
	}
}

/// Default mapper for reqwest-backed transports.
///
/// Request-builder failures are local mistakes and map to [`ConfigError`]; everything else is
/// a network failure.
#[cfg(feature = "reqwest")]
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, err: ReqwestError) -> Error {
		if err.is_builder() {
			return ConfigError::from(err).into();
		}

		TransportError::from(err).into()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Do not configure a client-level timeout on the wrapped client; the executor enforces
/// per-request timeouts itself and reports them as [`Error::Timeout`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn call(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(reqwest::Request::try_from(request)?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn network_mapper_wraps_any_error() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket stalled");
		let err = NetworkErrorMapper.map_transport_error(io);

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
		assert!(err.message().contains("socket stalled"));
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_connection_failure_maps_to_transport_error() {
		let client = ReqwestHttpClient::default();
		let request = ::http::Request::builder()
			.uri("http://127.0.0.1:1/unreachable")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let err = client.call(request).await.expect_err("Port 1 should refuse connections.");
		let mapped = ReqwestTransportErrorMapper.map_transport_error(err);

		assert!(matches!(mapped, Error::Transport(_)));
		assert!(!mapped.message().is_empty());
	}
}
