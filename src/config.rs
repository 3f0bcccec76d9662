//! Client configuration: base API URL, default timeout, and the auth routes the client
//! treats specially.

/// Builder API for assembling validated configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Immutable configuration consumed by [`Client`](crate::client::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL every relative request path is appended to.
	pub base_url: Url,
	/// Timeout applied when a request does not override it.
	pub default_timeout: Duration,
	/// Refresh endpoint; a 401 from this path never triggers another refresh.
	pub refresh_path: String,
	/// Login endpoint used by [`Client::login`](crate::client::Client::login).
	pub login_path: String,
	/// Logout endpoint used by [`Client::logout`](crate::client::Client::logout).
	pub logout_path: String,
	/// Host route the session is redirected to after a forced logout.
	pub login_route: String,
	/// Marker appended to the login route so the host can explain the redirect.
	pub unauthorized_marker: String,
}
impl ClientConfig {
	/// Environment variable holding the base API URL.
	pub const BASE_URL_ENV: &'static str = "DOCDESK_API_BASE_URL";
	/// Default request timeout (20 seconds).
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(20_000);
	/// Optional environment variable overriding the default timeout, in milliseconds.
	pub const TIMEOUT_ENV: &'static str = "DOCDESK_API_TIMEOUT_MS";

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Parses `base_url` and builds a configuration with default routes and timeout.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { value: base_url.to_owned(), source })?;

		Self::builder(url).build()
	}

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`, which maps variable names to values.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let raw = lookup(Self::BASE_URL_ENV)
			.filter(|value| !value.trim().is_empty())
			.ok_or(ConfigError::MissingEnv { key: Self::BASE_URL_ENV })?;
		let base_url = Url::parse(raw.trim())
			.map_err(|source| ConfigError::InvalidBaseUrl { value: raw.clone(), source })?;
		let mut builder = Self::builder(base_url);

		if let Some(value) = lookup(Self::TIMEOUT_ENV) {
			let millis = value
				.trim()
				.parse::<u64>()
				.map_err(|_| ConfigError::InvalidEnv { key: Self::TIMEOUT_ENV, value })?;

			builder = builder.default_timeout(Duration::from_millis(millis));
		}

		builder.build()
	}

	/// Resolves a request path against the base URL.
	///
	/// Relative paths are appended to the base URL verbatim, so a base of
	/// `https://host/api` and a path of `/documents` yield `https://host/api/documents`.
	/// Absolute `http(s)://` paths are used as-is.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let invalid = |source| ConfigError::InvalidEndpoint { path: path.to_owned(), source };

		if path.starts_with("http://") || path.starts_with("https://") {
			return Url::parse(path).map_err(invalid);
		}

		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&joined).map_err(invalid)
	}

	/// Returns `true` when `path` addresses the refresh endpoint.
	///
	/// Relative and absolute paths are both resolved through [`endpoint`](Self::endpoint) and
	/// compared by origin and path, ignoring the query, fragment, and a trailing `/`.
	pub fn is_refresh_path(&self, path: &str) -> bool {
		match (self.endpoint(path), self.endpoint(&self.refresh_path)) {
			(Ok(target), Ok(refresh)) =>
				target.origin() == refresh.origin() && route(target.path()) == route(refresh.path()),
			_ => route(path) == route(&self.refresh_path),
		}
	}

	/// Redirect target used on forced logout, e.g. `/login?reason=unauthorized`.
	pub fn login_redirect(&self) -> String {
		format!("{}?reason={}", self.login_route, self.unauthorized_marker)
	}
}

fn route(path: &str) -> &str {
	let end = path.find(['?', '#']).unwrap_or(path.len());

	path[..end].trim_end_matches('/')
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(base: &str) -> ClientConfig {
		ClientConfig::new(base).expect("Config fixture should build.")
	}

	#[test]
	fn defaults_match_documented_values() {
		let config = config("https://api.example.com");

		assert_eq!(config.default_timeout, Duration::from_millis(20_000));
		assert_eq!(config.refresh_path, "/auth/refresh");
		assert_eq!(config.login_redirect(), "/login?reason=unauthorized");
	}

	#[test]
	fn endpoint_appends_to_base_path() {
		let config = config("https://api.example.com/api/");

		assert_eq!(
			config.endpoint("/documents").expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/api/documents"
		);
		assert_eq!(
			config.endpoint("documents/7").expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/api/documents/7"
		);
		assert_eq!(
			config.endpoint("https://cdn.example.com/file").expect("Endpoint should resolve.").as_str(),
			"https://cdn.example.com/file"
		);
	}

	#[test]
	fn refresh_path_matching_ignores_query_and_trailing_slash() {
		let config = config("https://api.example.com");

		assert!(config.is_refresh_path("/auth/refresh"));
		assert!(config.is_refresh_path("/auth/refresh/?source=retry"));
		assert!(!config.is_refresh_path("/auth/refresh-token"));
		assert!(!config.is_refresh_path("/documents"));
	}

	#[test]
	fn refresh_path_matching_resolves_absolute_urls() {
		let config = config("https://api.example.com/api");

		assert!(config.is_refresh_path("https://api.example.com/api/auth/refresh"));
		assert!(config.is_refresh_path("https://api.example.com/api/auth/refresh/#retry"));
		assert!(config.is_refresh_path("auth/refresh"));
		assert!(!config.is_refresh_path("https://other.example.com/api/auth/refresh"));
		assert!(!config.is_refresh_path("https://api.example.com/auth/refresh"));
		assert!(!config.is_refresh_path("http://api.example.com/api/auth/refresh"));
	}

	#[test]
	fn from_lookup_reads_base_url_and_timeout() {
		let config = ClientConfig::from_lookup(|key| match key {
			ClientConfig::BASE_URL_ENV => Some("http://localhost:8080".into()),
			ClientConfig::TIMEOUT_ENV => Some("1500".into()),
			_ => None,
		})
		.expect("Lookup-driven config should build.");

		assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
		assert_eq!(config.default_timeout, Duration::from_millis(1500));
	}

	#[test]
	fn from_lookup_requires_base_url() {
		let err = ClientConfig::from_lookup(|_| None).expect_err("Missing base URL must fail.");

		assert!(matches!(err, ConfigError::MissingEnv { key: ClientConfig::BASE_URL_ENV }));
	}

	#[test]
	fn from_lookup_rejects_non_numeric_timeout() {
		let err = ClientConfig::from_lookup(|key| match key {
			ClientConfig::BASE_URL_ENV => Some("http://localhost:8080".into()),
			_ => Some("soon".into()),
		})
		.expect_err("Non-numeric timeout must fail.");

		assert!(matches!(err, ConfigError::InvalidEnv { key: ClientConfig::TIMEOUT_ENV, .. }));
	}
}
