//! Request execution: header assembly, per-request timeouts, and the 401 refresh-retry path.

// crates.io
use ::http::StatusCode;
// self
use crate::{
	_prelude::*,
	client::{ApiResponse, Client, RequestDescriptor, normalize},
	http::{HttpRequest, HttpResponse, HttpTransport, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Sends one request, failing with [`Error::Timeout`] when `timeout` elapses first.
///
/// The timer belongs to the returned future and is released on every exit path; an expired
/// timer drops the transport future, which cancels the network call.
pub(crate) async fn dispatch<C, M>(
	transport: &C,
	mapper: &M,
	request: HttpRequest,
	timeout: Duration,
) -> Result<HttpResponse>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	match tokio::time::timeout(timeout, transport.call(request)).await {
		Ok(Ok(response)) => Ok(response),
		Ok(Err(err)) => Err(mapper.map_transport_error(err)),
		Err(_) => Err(Error::Timeout { timeout }),
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Executes `descriptor` and normalizes the response.
	///
	/// A 401 on an authenticated, non-refresh request waits for the shared refresh and then
	/// replays the request once. A second 401 is returned as [`Error::Http`]; a failed refresh
	/// is returned as [`Error::AuthenticationFailed`].
	pub async fn send(&self, descriptor: RequestDescriptor) -> Result<ApiResponse<Value>> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.execute(&descriptor)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	pub(crate) async fn execute(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse<Value>> {
		let (response, epoch) = self.attempt(descriptor).await?;

		if !self.should_refresh(descriptor, &response) {
			return normalize(&response);
		}

		obs::debug_event("execute", &"access token rejected; awaiting refresh");

		self.refresh
			.refresh(epoch, || self.refresh_flight())
			.await
			.map_err(|reason| Error::AuthenticationFailed { reason })?;

		self.retry(descriptor).await
	}

	/// Sends `descriptor` once and returns the raw response with the refresh epoch observed
	/// before the access token was read.
	pub(crate) async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<(HttpResponse, u64)> {
		let epoch = self.refresh.epoch();
		let token =
			if descriptor.requires_auth() { self.store.access_token().await? } else { None };
		let request = descriptor.to_http(&self.config, token.as_ref())?;
		let timeout = descriptor.timeout_or(self.config.default_timeout);
		let response =
			dispatch(self.transport.as_ref(), self.transport_mapper.as_ref(), request, timeout)
				.await?;

		Ok((response, epoch))
	}

	async fn retry(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse<Value>> {
		const KIND: CallKind = CallKind::Retry;

		let span = CallSpan::new(KIND, "retry");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let (response, _) = self.attempt(descriptor).await?;

				normalize(&response)
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	fn should_refresh(&self, descriptor: &RequestDescriptor, response: &HttpResponse) -> bool {
		response.status() == StatusCode::UNAUTHORIZED
			&& descriptor.requires_auth()
			&& !self.config.is_refresh_path(&descriptor.path)
	}
}
