//! Storage contracts and built-in store implementations for client credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the client's credential pair.
///
/// The client reads the access token on every authenticated request and writes both tokens
/// in a single [`save_tokens`](TokenStore::save_tokens) call after a refresh. Implementations
/// must apply that write atomically: a concurrent [`load`](TokenStore::load) sees either the
/// old pair or the new one, never a mix.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Loads the stored pair, if any.
	fn load(&self) -> StoreFuture<'_, Option<CredentialPair>>;

	/// Replaces both tokens at once.
	fn save_tokens(&self, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Removes all stored credentials.
	fn clear_tokens(&self) -> StoreFuture<'_, ()>;

	/// Returns the current access token, if any.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.load().await?.map(|pair| pair.access_token)) })
	}

	/// Returns the current refresh token, if any.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.load().await?.map(|pair| pair.refresh_token)) })
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
