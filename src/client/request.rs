//! Request descriptors, per-call options, and query serialization.

// crates.io
use ::http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	error::ConfigError,
	http::HttpRequest,
};

/// Per-call overrides for timeout, authentication, and headers.
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// Timeout for this call; the client default applies when unset.
	pub timeout: Option<Duration>,
	/// Attach the stored access token and allow the refresh-retry path.
	pub requires_auth: bool,
	/// Extra headers; entries whose value is `None` are skipped.
	pub headers: Vec<(String, Option<String>)>,
}
impl RequestOptions {
	/// Options with authentication enabled and the client default timeout.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the timeout for this call.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Enables or disables authentication for this call.
	pub fn requires_auth(mut self, requires_auth: bool) -> Self {
		self.requires_auth = requires_auth;

		self
	}

	/// Sends the call without an `Authorization` header and without refresh handling.
	pub fn without_auth(self) -> Self {
		self.requires_auth(false)
	}

	/// Adds a header. A `Content-Type` header replaces the JSON default.
	pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.header_opt(name, Some(value))
	}

	/// Adds a header whose value may be absent; absent values are dropped at send time.
	pub fn header_opt(mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
		self.headers.push((name.into(), value.map(Into::into)));

		self
	}
}
impl Default for RequestOptions {
	fn default() -> Self {
		Self { timeout: None, requires_auth: true, headers: Vec::new() }
	}
}

/// One logical request: method, path, query, optional JSON body, and options.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base URL, or an absolute `http(s)://` URL.
	pub path: String,
	/// Serialized query pairs, appended in order.
	pub query: Vec<(String, String)>,
	/// JSON body; `None` sends no body.
	pub body: Option<Value>,
	/// Per-call overrides.
	pub options: RequestOptions,
}
impl RequestDescriptor {
	/// Creates a descriptor with no query, no body, and default options.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: None,
			options: RequestOptions::default(),
		}
	}

	/// Serializes `query` into query pairs; see [`query_pairs`].
	pub fn with_query<Q>(mut self, query: &Q) -> Result<Self, ConfigError>
	where
		Q: ?Sized + Serialize,
	{
		let value = serde_json::to_value(query).map_err(ConfigError::Serialize)?;

		self.query.extend(query_pairs(&value)?);

		Ok(self)
	}

	/// Serializes `body` as the JSON payload. A body that serializes to `null` sends nothing.
	pub fn with_body<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let value = serde_json::to_value(body).map_err(ConfigError::Serialize)?;

		self.body = (!value.is_null()).then_some(value);

		Ok(self)
	}

	/// Replaces the per-call options.
	pub fn with_options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}

	/// Whether the call carries the access token and may trigger a refresh.
	pub fn requires_auth(&self) -> bool {
		self.options.requires_auth
	}

	/// Effective timeout given the client default.
	pub fn timeout_or(&self, default: Duration) -> Duration {
		self.options.timeout.unwrap_or(default)
	}

	/// Resolves the full request URL, including query pairs.
	pub fn url(&self, config: &ClientConfig) -> Result<Url, ConfigError> {
		let mut url = config.endpoint(&self.path)?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&self.query);
		}

		Ok(url)
	}

	/// Assembles headers: JSON content type, caller headers, then the bearer token.
	///
	/// `token` is only attached when the descriptor requires auth; a missing token sends the
	/// request unauthenticated.
	pub fn headers(&self, token: Option<&TokenSecret>) -> Result<HeaderMap, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		for (name, value) in &self.options.headers {
			let Some(value) = value else { continue };
			let header_name = HeaderName::from_bytes(name.as_bytes())
				.map_err(|_| ConfigError::InvalidHeaderName { name: name.clone() })?;
			let header_value = HeaderValue::from_str(value)
				.map_err(|_| ConfigError::InvalidHeaderValue { name: name.clone() })?;

			headers.insert(header_name, header_value);
		}

		if let Some(token) = token.filter(|_| self.requires_auth()) {
			let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
				ConfigError::InvalidHeaderValue { name: AUTHORIZATION.as_str().to_owned() }
			})?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		Ok(headers)
	}

	/// Builds the transport request.
	pub fn to_http(
		&self,
		config: &ClientConfig,
		token: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let url = self.url(config)?;
		let body = match &self.body {
			Some(value) => serde_json::to_vec(value).map_err(ConfigError::Serialize)?,
			None => Vec::new(),
		};
		let mut builder = ::http::Request::builder().method(self.method.clone()).uri(url.as_str());

		if let Some(headers) = builder.headers_mut() {
			*headers = self.headers(token)?;
		}

		Ok(builder.body(body)?)
	}
}

/// Flattens a serialized query object into string pairs.
///
/// `null` values are omitted; strings pass through; numbers and booleans are stringified;
/// arrays are joined with `,`; nested objects are emitted as JSON text. A top-level `null`
/// (such as `()` or `None`) yields no pairs.
pub fn query_pairs(value: &Value) -> Result<Vec<(String, String)>, ConfigError> {
	let map = match value {
		Value::Null => return Ok(Vec::new()),
		Value::Object(map) => map,
		other => return Err(ConfigError::InvalidQuery { found: json_kind(other) }),
	};

	Ok(map
		.iter()
		.filter(|(_, value)| !value.is_null())
		.map(|(key, value)| (key.clone(), stringify(value)))
		.collect())
}

fn stringify(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
		Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
