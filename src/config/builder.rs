// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL for every relative request path.
	pub base_url: Url,
	/// Timeout applied when a request does not override it.
	pub default_timeout: Duration,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Login endpoint path.
	pub login_path: String,
	/// Logout endpoint path.
	pub logout_path: String,
	/// Host route used for forced-logout redirects.
	pub login_route: String,
	/// Marker appended to the login route on forced logout.
	pub unauthorized_marker: String,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the base URL and default routes.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			default_timeout: ClientConfig::DEFAULT_TIMEOUT,
			refresh_path: "/auth/refresh".into(),
			login_path: "/auth/login".into(),
			logout_path: "/auth/logout".into(),
			login_route: "/login".into(),
			unauthorized_marker: "unauthorized".into(),
		}
	}

	/// Overrides the default request timeout.
	pub fn default_timeout(mut self, timeout: Duration) -> Self {
		self.default_timeout = timeout;

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the logout endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();

		self
	}

	/// Overrides the host login route used for forced-logout redirects.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the marker appended to the login route.
	pub fn unauthorized_marker(mut self, marker: impl Into<String>) -> Self {
		self.unauthorized_marker = marker.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			default_timeout: self.default_timeout,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			logout_path: self.logout_path,
			login_route: self.login_route,
			unauthorized_marker: self.unauthorized_marker,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.default_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		validate_path("refresh", &self.refresh_path)?;
		validate_path("login", &self.login_path)?;
		validate_path("logout", &self.logout_path)?;
		validate_path("login route", &self.login_route)?;

		Ok(())
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidPath { name, path: path.to_owned() })
	}
}
