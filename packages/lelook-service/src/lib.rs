pub mod compare;
pub mod ingest;
pub mod products;
pub mod search;
pub mod semantic;

mod error;

pub use compare::CompareProductsResponse;
pub use error::{Error, Result};
pub use ingest::IndexWriter;
pub use lelook_providers::catalog::CatalogFilters;
pub use lelook_storage::qdrant::{IndexHit, IndexPoint};
pub use products::StoredProduct;
pub use search::{SearchProductsRequest, SearchProductsResponse, rerank::RerankOutcome};
pub use semantic::SemanticQuery;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Map, Value};
use uuid::Uuid;

use lelook_config::{CatalogProviderConfig, Config, EmbeddingProviderConfig, LlmProviderConfig};
use lelook_providers::{catalog, embedding, rerank};
use lelook_storage::qdrant::QdrantStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait CatalogProvider
where
	Self: Send + Sync,
{
	/// Returns raw, provider-shaped listings.
	fn search<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		query: &'a str,
		filters: &'a CatalogFilters,
		num_results: u32,
	) -> BoxFuture<'a, Result<Vec<Value>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	/// Returns the collaborator's structured output as is. Callers validate it.
	fn rank<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		summaries: &'a [Value],
	) -> BoxFuture<'a, Result<Value>>;
}

pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(
		&'a self,
		id: Uuid,
		vector: Vec<f32>,
		payload: Map<String, Value>,
	) -> BoxFuture<'a, Result<()>>;

	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u64,
		category: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>>;

	fn scroll<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<IndexPoint>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub catalog: Arc<dyn CatalogProvider>,
	pub rerank: Arc<dyn RerankProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		catalog: Arc<dyn CatalogProvider>,
		rerank: Arc<dyn RerankProvider>,
	) -> Self {
		Self { embedding, catalog, rerank }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), catalog: provider.clone(), rerank: provider }
	}
}

/// Process-wide context shared by every request.
///
/// `index` is `None` when the vector store could not be reached at startup; the pipeline then
/// runs without semantic matches or persistence.
pub struct LelookService {
	pub cfg: Config,
	pub index: Option<Arc<dyn VectorIndex>>,
	pub providers: Providers,
}
impl LelookService {
	pub fn new(cfg: Config, index: Option<Arc<dyn VectorIndex>>) -> Self {
		Self { cfg, index, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		index: Option<Arc<dyn VectorIndex>>,
		providers: Providers,
	) -> Self {
		Self { cfg, index, providers }
	}

	pub(crate) fn index_writer(&self) -> Option<IndexWriter> {
		let index = self.index.clone()?;

		Some(IndexWriter::new(
			index,
			self.providers.embedding.clone(),
			self.cfg.providers.embedding.clone(),
		))
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { embedding::embed(cfg, texts).await.map_err(Error::from) })
	}
}
impl CatalogProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		query: &'a str,
		filters: &'a CatalogFilters,
		num_results: u32,
	) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			catalog::search(cfg, query, filters, num_results).await.map_err(Error::from)
		})
	}
}
impl RerankProvider for DefaultProviders {
	fn rank<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		summaries: &'a [Value],
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { rerank::rank(cfg, query, summaries).await.map_err(Error::from) })
	}
}

impl VectorIndex for QdrantStore {
	fn upsert<'a>(
		&'a self,
		id: Uuid,
		vector: Vec<f32>,
		payload: Map<String, Value>,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			QdrantStore::upsert(self, id, vector, payload).await.map_err(Error::from)
		})
	}

	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u64,
		category: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		Box::pin(async move {
			QdrantStore::search(self, vector, limit, category).await.map_err(Error::from)
		})
	}

	fn scroll<'a>(&'a self, limit: u32) -> BoxFuture<'a, Result<Vec<IndexPoint>>> {
		Box::pin(async move { QdrantStore::scroll(self, limit).await.map_err(Error::from) })
	}
}
