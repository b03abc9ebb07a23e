use std::sync::Arc;

use color_eyre::eyre;

use vicinity_config::{Config, STORAGE_BACKEND_MEMORY, STORAGE_BACKEND_POSTGRES};
use vicinity_service::{Stores, VicinityService};
use vicinity_storage::{db::Db, memory::MemoryStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<VicinityService>,
}
impl AppState {
	/// Picks the storage backend named by the config. This is the only place a backend is chosen.
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let stores = match config.storage.backend.as_str() {
			STORAGE_BACKEND_POSTGRES => {
				let postgres = config.storage.postgres.as_ref().ok_or_else(|| {
					eyre::eyre!("storage.postgres is required for the postgres backend.")
				})?;
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				Stores::shared(Arc::new(db))
			},
			STORAGE_BACKEND_MEMORY => {
				tracing::warn!("Using the in-memory storage backend; data is lost on exit.");

				Stores::shared(Arc::new(MemoryStore::new(&config.storage.memory)))
			},
			other => return Err(eyre::eyre!("Unsupported storage backend {other:?}.")),
		};

		Ok(Self::with_service(VicinityService::new(config, stores)))
	}

	pub fn with_service(service: VicinityService) -> Self {
		Self { service: Arc::new(service) }
	}
}
