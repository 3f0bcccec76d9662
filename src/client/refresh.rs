//! Single-flight credential refresh.
//!
//! When a request sees a 401 the executor asks the client's [`RefreshCoordinator`] for a
//! refresh. The first caller starts a flight: one POST to the refresh endpoint, followed by
//! one atomic write of the new pair. Every caller arriving while that flight is running
//! awaits the same shared future instead of issuing its own call, so N concurrent 401s cost
//! exactly one network refresh and all N observe its outcome.
//!
//! The check for a running flight and the installation of a new one happen under one
//! synchronous lock, with no `.await` in between. Each successful flight bumps an epoch; a
//! caller whose 401 was produced by a token read before the latest successful flight skips
//! the refresh and retries with the token that flight stored.
//!
//! Flights run on their own task. Waiters only await the task's result, so a caller whose own
//! timeout fires, or who is dropped, never cancels a refresh the server may already have
//! honored.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use ::http::Method;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;
// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	client::{Client, RequestDescriptor, RequestOptions, executor, login},
	config::ClientConfig,
	error::RefreshError,
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::TokenStore,
};

/// Result every waiter of a refresh flight observes.
pub type RefreshOutcome = std::result::Result<(), RefreshError>;

type SharedFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Per-client single-flight gate for credential refresh.
#[derive(Default)]
pub struct RefreshCoordinator {
	state: Arc<Mutex<RefreshState>>,
	metrics: Arc<RefreshMetrics>,
}
impl RefreshCoordinator {
	/// Number of successful refreshes so far.
	///
	/// Capture this before reading the access token and hand it back to
	/// [`refresh`](Self::refresh) so a 401 caused by an already-replaced token does not start
	/// another flight.
	pub fn epoch(&self) -> u64 {
		self.state.lock().epoch
	}

	/// Returns `true` while a refresh flight is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().flight.is_some()
	}

	/// Counters for flights started, joined, and settled.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Joins the running flight, or starts one with `start` when none is running.
	///
	/// Returns `Ok(())` without refreshing when no flight is running and a refresh has
	/// succeeded since `observed_epoch` was captured. A started flight runs on its own tokio
	/// task, so it completes and persists its outcome even if every waiter is dropped.
	///
	/// Must be called from within a tokio runtime.
	pub async fn refresh<F>(&self, observed_epoch: u64, start: F) -> RefreshOutcome
	where
		F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
	{
		let Some(flight) = self.acquire(observed_epoch, start) else {
			obs::record_call_outcome(CallKind::Refresh, CallOutcome::Reused);
			obs::debug_event("refresh", &"credentials already refreshed; retrying");

			return Ok(());
		};

		flight.await
	}

	fn acquire<F>(&self, observed_epoch: u64, start: F) -> Option<SharedFlight>
	where
		F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
	{
		let mut state = self.state.lock();

		if let Some(flight) = &state.flight {
			self.metrics.record_join();
			obs::record_call_outcome(CallKind::Refresh, CallOutcome::Joined);

			return Some(flight.shared.clone());
		}
		if state.epoch != observed_epoch {
			return None;
		}

		let id = state.next_flight;

		state.next_flight += 1;
		self.metrics.record_attempt();

		// The task cannot settle before the flight is installed: settling takes this lock.
		let task = tokio::spawn(Self::settle(
			Arc::clone(&self.state),
			Arc::clone(&self.metrics),
			id,
			start(),
		));
		let shared = Self::join(Arc::clone(&self.state), Arc::clone(&self.metrics), id, task)
			.boxed()
			.shared();

		state.flight = Some(Flight { id, shared: shared.clone() });

		Some(shared)
	}

	async fn settle(
		state: Arc<Mutex<RefreshState>>,
		metrics: Arc<RefreshMetrics>,
		id: u64,
		flight: BoxFuture<'static, RefreshOutcome>,
	) -> RefreshOutcome {
		let outcome = flight.await;
		let mut state = state.lock();

		state.clear(id);

		match &outcome {
			Ok(()) => {
				state.epoch += 1;
				metrics.record_success();
			},
			Err(_) => metrics.record_failure(),
		}

		outcome
	}

	async fn join(
		state: Arc<Mutex<RefreshState>>,
		metrics: Arc<RefreshMetrics>,
		id: u64,
		task: JoinHandle<RefreshOutcome>,
	) -> RefreshOutcome {
		match task.await {
			Ok(outcome) => outcome,
			Err(err) => {
				state.lock().clear(id);
				metrics.record_failure();

				Err(RefreshError::Request { message: format!("refresh task stopped: {err}") })
			},
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("epoch", &state.epoch)
			.field("refreshing", &state.flight.is_some())
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[derive(Default)]
struct RefreshState {
	flight: Option<Flight>,
	next_flight: u64,
	epoch: u64,
}
impl RefreshState {
	fn clear(&mut self, id: u64) {
		if self.flight.as_ref().is_some_and(|flight| flight.id == id) {
			self.flight = None;
		}
	}
}

struct Flight {
	id: u64,
	shared: SharedFlight,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
	refresh_token: &'a str,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Refreshes the stored credentials, joining any refresh already in flight.
	///
	/// A failed refresh runs the forced logout once: tokens are cleared, cookies are cleared,
	/// and the session is redirected to the login route.
	pub async fn refresh_tokens(&self) -> Result<()> {
		let epoch = self.refresh.epoch();

		self.refresh
			.refresh(epoch, || self.refresh_flight())
			.await
			.map_err(|reason| Error::AuthenticationFailed { reason })
	}

	pub(crate) fn refresh_flight(&self) -> BoxFuture<'static, RefreshOutcome> {
		const KIND: CallKind = CallKind::Refresh;

		let transport = Arc::clone(&self.transport);
		let mapper = Arc::clone(&self.transport_mapper);
		let store = Arc::clone(&self.store);
		let session = Arc::clone(&self.session);
		let config = Arc::clone(&self.config);

		async move {
			let span = CallSpan::new(KIND, "refresh_flight");

			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let outcome = span
				.instrument(exchange_refresh_token(
					transport.as_ref(),
					mapper.as_ref(),
					store.as_ref(),
					&config,
				))
				.await;

			obs::record_call_outcome(KIND, CallOutcome::of(&outcome));

			if let Err(reason) = &outcome {
				obs::warn_event("refresh_flight", reason);
				login::force_logout(store.as_ref(), session.as_ref(), &config).await;
			}

			outcome
		}
		.boxed()
	}
}

/// Exchanges the stored refresh token for a new pair and persists it in one write.
async fn exchange_refresh_token<C, M>(
	transport: &C,
	mapper: &M,
	store: &dyn TokenStore,
	config: &ClientConfig,
) -> RefreshOutcome
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let refresh_token = store
		.refresh_token()
		.await
		.map_err(|err| RefreshError::Store { message: err.to_string() })?
		.filter(|token| !token.expose().is_empty())
		.ok_or(RefreshError::MissingRefreshToken)?;
	let request = RequestDescriptor::new(Method::POST, config.refresh_path.as_str())
		.with_body(&RefreshRequest { refresh_token: refresh_token.expose() })
		.map_err(request_error)?
		.with_options(RequestOptions::new().without_auth())
		.to_http(config, None)
		.map_err(request_error)?;
	let response = executor::dispatch(transport, mapper, request, config.default_timeout)
		.await
		.map_err(request_error)?;

	if !response.status().is_success() {
		return Err(RefreshError::Rejected { status: response.status().as_u16() });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());
	let grant: TokenGrant = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|err| RefreshError::MalformedResponse { message: err.to_string() })?;
	let pair = grant.into_pair(&refresh_token).ok_or(RefreshError::MissingAccessToken)?;

	store.save_tokens(pair).await.map_err(|err| RefreshError::Store { message: err.to_string() })
}

fn request_error(err: impl Display) -> RefreshError {
	RefreshError::Request { message: err.to_string() }
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	fn counting_flight(
		calls: &Arc<AtomicUsize>,
		outcome: RefreshOutcome,
	) -> impl FnOnce() -> BoxFuture<'static, RefreshOutcome> {
		let calls = Arc::clone(calls);

		move || {
			calls.fetch_add(1, Ordering::SeqCst);

			async move {
				tokio::time::sleep(Duration::from_millis(20)).await;

				outcome
			}
			.boxed()
		}
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_flight() {
		let coordinator = RefreshCoordinator::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let (a, b, c) = tokio::join!(
			coordinator.refresh(0, counting_flight(&calls, Ok(()))),
			coordinator.refresh(0, counting_flight(&calls, Ok(()))),
			coordinator.refresh(0, counting_flight(&calls, Ok(()))),
		);

		assert_eq!((a, b, c), (Ok(()), Ok(()), Ok(())));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.metrics().attempts(), 1);
		assert_eq!(coordinator.metrics().joins(), 2);
		assert_eq!(coordinator.metrics().successes(), 1);
		assert_eq!(coordinator.epoch(), 1);
		assert!(!coordinator.is_refreshing());
	}

	#[tokio::test]
	async fn stale_epoch_skips_refresh() {
		let coordinator = RefreshCoordinator::default();
		let calls = Arc::new(AtomicUsize::new(0));

		coordinator
			.refresh(0, counting_flight(&calls, Ok(())))
			.await
			.expect("First refresh should succeed.");

		let outcome = coordinator.refresh(0, counting_flight(&calls, Ok(()))).await;

		assert_eq!(outcome, Ok(()));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.epoch(), 1);
	}

	#[tokio::test]
	async fn failed_flight_is_shared_and_cleared() {
		let coordinator = RefreshCoordinator::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let failure = Err(RefreshError::Rejected { status: 401 });
		let (a, b) = tokio::join!(
			coordinator.refresh(0, counting_flight(&calls, failure.clone())),
			coordinator.refresh(0, counting_flight(&calls, failure.clone())),
		);

		assert_eq!(a, failure);
		assert_eq!(b, failure);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.metrics().failures(), 1);
		assert_eq!(coordinator.epoch(), 0);
		assert!(!coordinator.is_refreshing());

		coordinator
			.refresh(0, counting_flight(&calls, Ok(())))
			.await
			.expect("A later refresh should start a new flight.");

		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert_eq!(coordinator.metrics().attempts(), 2);
	}

	#[tokio::test]
	async fn flight_completes_after_its_only_waiter_is_dropped() {
		let coordinator = RefreshCoordinator::default();
		let calls = Arc::new(AtomicUsize::new(0));
		let abandoned = tokio::time::timeout(
			Duration::from_millis(1),
			coordinator.refresh(0, counting_flight(&calls, Ok(()))),
		)
		.await;

		assert!(abandoned.is_err());
		assert!(coordinator.is_refreshing());

		tokio::time::sleep(Duration::from_millis(100)).await;

		assert!(!coordinator.is_refreshing());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.metrics().successes(), 1);
		assert_eq!(coordinator.epoch(), 1);
	}

	#[tokio::test]
	async fn panicking_flight_fails_waiters_and_clears_state() {
		let coordinator = RefreshCoordinator::default();
		let outcome = coordinator
			.refresh(0, || {
				async {
					let outcome: RefreshOutcome = panic!("Refresh flight fixture panics.");

					outcome
				}
				.boxed()
			})
			.await;

		assert!(matches!(outcome, Err(RefreshError::Request { .. })));
		assert!(!coordinator.is_refreshing());
		assert_eq!(coordinator.metrics().failures(), 1);
		assert_eq!(coordinator.epoch(), 0);
	}
}
