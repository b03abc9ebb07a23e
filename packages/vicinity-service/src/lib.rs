pub mod geo;
pub mod history;
pub mod search;
pub mod submit;
pub mod throttle;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use history::{
	HistoryDeleteRequest, HistoryDeleteResponse, HistoryGetRequest, HistoryItem,
	HistoryListRequest, HistoryListResponse,
};
pub use search::{SearchOutcome, SearchPhase, SearchRequest, SearchResponse};
pub use submit::{SubmitRequest, SubmitResponse};

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex},
};

use time::OffsetDateTime;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use vicinity_config::{Config, Favorites};
use vicinity_domain::item::{ItemScore, ItemType};
use vicinity_providers::favorites;
use vicinity_storage::{HistoryStore, SubmissionStore, ThrottleStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait FavoritesProvider
where
	Self: Send + Sync,
{
	fn favorites<'a>(
		&'a self,
		cfg: &'a Favorites,
		access_token: &'a str,
		item_type: ItemType,
	) -> BoxFuture<'a, vicinity_providers::Result<Vec<ItemScore>>>;
}

pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

#[derive(Clone)]
pub struct Stores {
	pub submissions: Arc<dyn SubmissionStore>,
	pub history: Arc<dyn HistoryStore>,
	pub throttle: Arc<dyn ThrottleStore>,
}

pub struct SystemClock;

pub struct VicinityService {
	pub cfg: Config,
	pub stores: Stores,
	pub favorites: Arc<dyn FavoritesProvider>,
	pub clock: Arc<dyn Clock>,
	in_flight: InFlight,
}

/// Per `(owner_id, item_type)` async locks that keep the throttle check and the submission it
/// guards from interleaving inside one process.
#[derive(Default)]
struct InFlight {
	locks: Mutex<HashMap<(String, ItemType), Arc<AsyncMutex<()>>>>,
}

struct HttpFavorites;

impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

impl FavoritesProvider for HttpFavorites {
	fn favorites<'a>(
		&'a self,
		cfg: &'a Favorites,
		access_token: &'a str,
		item_type: ItemType,
	) -> BoxFuture<'a, vicinity_providers::Result<Vec<ItemScore>>> {
		Box::pin(favorites::fetch(cfg, access_token, item_type))
	}
}

impl Stores {
	pub fn new(
		submissions: Arc<dyn SubmissionStore>,
		history: Arc<dyn HistoryStore>,
		throttle: Arc<dyn ThrottleStore>,
	) -> Self {
		Self { submissions, history, throttle }
	}

	/// Uses one backend for all three concerns.
	pub fn shared<S>(store: Arc<S>) -> Self
	where
		S: SubmissionStore + HistoryStore + ThrottleStore + 'static,
	{
		Self { submissions: store.clone(), history: store.clone(), throttle: store }
	}
}

impl InFlight {
	async fn acquire(&self, owner_id: &str, item_type: ItemType) -> OwnedMutexGuard<()> {
		let lock = {
			let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());

			// Only the map holds an idle lock.
			locks.retain(|_, lock| Arc::strong_count(lock) > 1);

			locks.entry((owner_id.to_string(), item_type)).or_default().clone()
		};

		lock.lock_owned().await
	}
}

impl VicinityService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self::with_parts(cfg, stores, Arc::new(HttpFavorites), Arc::new(SystemClock))
	}

	pub fn with_parts(
		cfg: Config,
		stores: Stores,
		favorites: Arc<dyn FavoritesProvider>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self { cfg, stores, favorites, clock, in_flight: InFlight::default() }
	}
}

pub(crate) fn require_id<'a>(field: &str, value: &'a str) -> Result<&'a str> {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return Err(Error::Validation { message: format!("{field} is required.") });
	}

	Ok(trimmed)
}
