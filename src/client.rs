//! Authenticated HTTP client: bearer auth, single-flight refresh, and normalized results.
//!
//! [`Client`] owns the transport, token store, session effects, configuration, and the
//! per-client [`RefreshCoordinator`]. Clones share all of them, so every clone joins the same
//! refresh when concurrent requests hit a 401; separate clients never coordinate.

pub mod normalize;
pub mod refresh;
pub mod request;

mod executor;
mod login;
mod verbs;

pub use normalize::*;
pub use refresh::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	http::{HttpTransport, TransportErrorMapper},
	session::{NoopSessionEffects, SessionEffects},
	store::TokenStore,
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Token-refresh-aware REST client for one API base URL.
pub struct Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for every outbound request, including refresh calls.
	pub transport: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Token store holding the credential pair.
	pub store: Arc<dyn TokenStore>,
	/// Host side effects run on forced and explicit logout.
	pub session: Arc<dyn SessionEffects>,
	/// Base URL, default timeout, and auth routes.
	pub config: Arc<ClientConfig>,
	/// Single-flight refresh state shared by every clone of this client.
	pub refresh: Arc<RefreshCoordinator>,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		transport: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			transport: transport.into(),
			transport_mapper: mapper.into(),
			store,
			session: Arc::new(NoopSessionEffects),
			config: Arc::new(config),
			refresh: Default::default(),
		}
	}

	/// Replaces the session effects run on forced and explicit logout.
	pub fn with_session_effects(mut self, session: Arc<dyn SessionEffects>) -> Self {
		self.session = session;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Self {
		Self::with_transport(
			config,
			store,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			transport_mapper: Arc::clone(&self.transport_mapper),
			store: Arc::clone(&self.store),
			session: Arc::clone(&self.session),
			config: Arc::clone(&self.config),
			refresh: Arc::clone(&self.refresh),
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_url", &self.config.base_url.as_str())
			.field("default_timeout", &self.config.default_timeout)
			.field("refresh", &self.refresh)
			.finish()
	}
}
