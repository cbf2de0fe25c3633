use std::sync::Arc;

use lelook_service::{LelookService, VectorIndex};
use lelook_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LelookService>,
}
impl AppState {
	/// Connects the vector index and builds the service.
	///
	/// An unreachable index is not fatal: requests are served from the catalog alone.
	pub async fn new(config: lelook_config::Config) -> Self {
		let index = match connect_index(&config.storage.qdrant).await {
			Ok(index) => Some(index),
			Err(err) => {
				tracing::warn!(
					error = %err,
					url = %config.storage.qdrant.url,
					"Vector index is unavailable; serving without semantic search."
				);

				None
			},
		};

		Self::from_service(LelookService::new(config, index))
	}

	pub fn from_service(service: LelookService) -> Self {
		Self { service: Arc::new(service) }
	}
}

async fn connect_index(
	cfg: &lelook_config::Qdrant,
) -> lelook_storage::Result<Arc<dyn VectorIndex>> {
	let store = QdrantStore::new(cfg)?;

	store.ensure_collection().await?;

	Ok(Arc::new(store))
}
