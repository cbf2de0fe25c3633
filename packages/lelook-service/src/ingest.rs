use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use lelook_config::EmbeddingProviderConfig;
use lelook_domain::{ProductRecord, Retrieved, listing};

use crate::{CatalogFilters, EmbeddingProvider, Error, LelookService, Result, VectorIndex};

/// Embeds and stores product records. Cheap to clone into background tasks.
#[derive(Clone)]
pub struct IndexWriter {
	index: Arc<dyn VectorIndex>,
	embedding: Arc<dyn EmbeddingProvider>,
	cfg: EmbeddingProviderConfig,
}
impl IndexWriter {
	pub fn new(
		index: Arc<dyn VectorIndex>,
		embedding: Arc<dyn EmbeddingProvider>,
		cfg: EmbeddingProviderConfig,
	) -> Self {
		Self { index, embedding, cfg }
	}

	/// Stores one record under a fresh id and returns that id.
	pub async fn persist(&self, record: &ProductRecord) -> Result<Uuid> {
		let texts = [record.embedding_text()];
		let vector = self.embedding.embed(&self.cfg, &texts).await?.into_iter().next().ok_or_else(
			|| Error::Provider { message: "Embedding provider returned no vectors.".to_string() },
		)?;
		let id = Uuid::new_v4();

		self.index.upsert(id, vector, record.index_payload()).await?;

		Ok(id)
	}

	/// Stores every record, skipping the ones that fail. Returns how many were stored.
	pub async fn persist_batch(&self, records: &[ProductRecord]) -> usize {
		let mut stored = 0;

		for record in records {
			match self.persist(record).await {
				Ok(_) => stored += 1,
				Err(err) => {
					tracing::warn!(
						error = %err,
						source_url = %record.source_url,
						"Failed to persist catalog product."
					);
				},
			}
		}

		stored
	}
}

impl LelookService {
	/// Queries the shopping catalog and normalizes every listing.
	///
	/// An unconfigured or failing catalog yields no listings.
	pub async fn catalog_search(
		&self,
		query: &str,
		filters: &CatalogFilters,
		num_results: u32,
	) -> Vec<Retrieved> {
		let Some(cfg) = self.cfg.providers.catalog.as_ref() else {
			tracing::debug!("Catalog provider is not configured.");

			return Vec::new();
		};

		match self.providers.catalog.search(cfg, query, filters, num_results).await {
			Ok(listings) => listings
				.iter()
				.map(|raw| listing::normalize_listing(raw, filters.category.as_deref()))
				.collect(),
			Err(err) => {
				tracing::warn!(error = %err, "Catalog search degraded to empty results.");

				Vec::new()
			},
		}
	}

	/// Persists one record. Failures are logged and reported as `false`.
	pub async fn persist_product(&self, record: &ProductRecord) -> bool {
		let Some(writer) = self.index_writer() else {
			tracing::debug!("Vector index is not initialized; skipping persistence.");

			return false;
		};

		match writer.persist(record).await {
			Ok(_) => true,
			Err(err) => {
				tracing::warn!(
					error = %err,
					source_url = %record.source_url,
					"Failed to persist catalog product."
				);

				false
			},
		}
	}

	/// Persists records on a background task. The search response never waits for it.
	pub fn persist_in_background(&self, records: Vec<ProductRecord>) -> Option<JoinHandle<usize>> {
		if records.is_empty() {
			return None;
		}

		let writer = self.index_writer()?;

		Some(tokio::spawn(async move {
			let total = records.len();
			let stored = writer.persist_batch(&records).await;

			tracing::info!(stored, total, "Persisted catalog products.");

			stored
		}))
	}
}
