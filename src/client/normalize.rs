//! Response normalization into [`ApiResponse`] or the uniform [`Error`] shape.
//!
//! Everything here is a pure function of the response status, headers, and body bytes; no
//! network calls and no timers.

// crates.io
use ::http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ErrorResponse, http::HttpResponse};

/// Successful response: parsed payload plus HTTP status.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse<T> {
	/// Parsed payload; an empty JSON object when the body was empty or not JSON.
	pub data: T,
	/// HTTP status code.
	pub status: u16,
}
impl<T> ApiResponse<T> {
	/// Consumes the response, returning the payload.
	pub fn into_data(self) -> T {
		self.data
	}
}
impl ApiResponse<Value> {
	/// Decodes the JSON payload into `T`, reporting the failing path on error.
	///
	/// An empty payload (the `{}` produced for empty or non-JSON bodies) that does not decode
	/// into `T` is retried as `null`, so `()`, `Option<_>`, and unit structs accept it.
	pub fn decode<T>(self) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		let status = self.status;
		let empty = self.data.as_object().is_some_and(|map| map.is_empty());

		match serde_path_to_error::deserialize(self.data) {
			Ok(data) => Ok(ApiResponse { data, status }),
			Err(source) if empty => T::deserialize(Value::Null)
				.map(|data| ApiResponse { data, status })
				.map_err(|_| Error::decode(status, source)),
			Err(source) => Err(Error::decode(status, source)),
		}
	}
}

/// Normalizes a transport response.
pub fn normalize(response: &HttpResponse) -> Result<ApiResponse<Value>> {
	normalize_parts(response.status(), response.headers(), response.body())
}

/// Normalizes a response from its parts: 2xx becomes [`ApiResponse`], anything else becomes
/// [`Error::Http`].
pub fn normalize_parts(
	status: StatusCode,
	headers: &HeaderMap,
	body: &[u8],
) -> Result<ApiResponse<Value>> {
	if status.is_success() { success(status, headers, body) } else { Err(http_error(status, body)) }
}

/// Builds the error for a non-2xx response.
///
/// The body is parsed as JSON when possible and falls back to an empty object. The message
/// prefers the body's `message` field, then the status text, then a generic fallback.
pub fn http_error(status: StatusCode, body: &[u8]) -> Error {
	let data = serde_json::from_slice::<Value>(body).unwrap_or_else(|_| empty_object());
	let message = data
		.get("message")
		.and_then(Value::as_str)
		.filter(|message| !message.trim().is_empty())
		.map(str::to_owned)
		.or_else(|| status.canonical_reason().map(str::to_owned))
		.unwrap_or_else(|| format!("Request failed with status {}.", status.as_u16()));

	Error::Http { message, response: ErrorResponse { status: status.as_u16(), data } }
}

/// Returns `true` when the content type is `application/json` or a `+json` suffix type.
pub fn is_json(headers: &HeaderMap) -> bool {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.map(|mime| {
			let mime = mime.trim().to_ascii_lowercase();

			mime == "application/json" || mime.ends_with("+json")
		})
		.unwrap_or(false)
}

fn success(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Result<ApiResponse<Value>> {
	let status = status.as_u16();

	if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
		return Ok(ApiResponse { data: empty_object(), status });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let data = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::decode(status, source))?;

	Ok(ApiResponse { data, status })
}

fn empty_object() -> Value {
	Value::Object(Default::default())
}
