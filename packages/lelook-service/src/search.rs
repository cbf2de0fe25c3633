pub mod merge;
pub mod rerank;

use serde::{Deserialize, Serialize};

use lelook_domain::{ProductRecord, Retrieved};

use crate::{CatalogFilters, Error, LelookService, Result, SemanticQuery};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SearchProductsRequest {
	pub query: String,
	pub category: Option<String>,
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
	pub free_shipping: Option<bool>,
	pub on_sale: Option<bool>,
	pub num_results: Option<u32>,
	pub hybrid_weight: Option<f32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchProductsResponse {
	pub query: String,
	pub products: Vec<ProductRecord>,
	pub semantic_count: usize,
	pub catalog_count: usize,
	pub reranked: bool,
}

impl LelookService {
	/// Runs the hybrid pipeline: semantic and catalog retrieval in parallel, merge, rerank.
	///
	/// Catalog records are persisted in the background when enabled. Only malformed requests
	/// return an error; collaborator failures shrink the result instead.
	pub async fn search_products(
		&self,
		req: SearchProductsRequest,
	) -> Result<SearchProductsResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}
		if req.num_results == Some(0) {
			return Err(Error::InvalidRequest {
				message: "num_results must be greater than zero.".to_string(),
			});
		}
		if let Some(weight) = req.hybrid_weight
			&& !(weight.is_finite() && (0.0..=1.0).contains(&weight))
		{
			return Err(Error::InvalidRequest {
				message: "hybrid_weight must be in the range 0.0-1.0.".to_string(),
			});
		}

		let limit = req
			.num_results
			.unwrap_or(self.cfg.search.default_results)
			.min(self.cfg.search.max_results);
		let weight = req.hybrid_weight.unwrap_or(self.cfg.search.hybrid_weight);
		let category = req.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
		let filters = CatalogFilters {
			min_price: req.min_price,
			max_price: req.max_price,
			free_shipping: req.free_shipping,
			on_sale: req.on_sale,
			category: category.map(str::to_string),
		};
		let semantic_query = SemanticQuery {
			query,
			limit,
			category,
			min_price: req.min_price,
			max_price: req.max_price,
		};
		let (semantic, catalog) = tokio::join!(
			self.semantic_search(semantic_query),
			self.catalog_search(query, &filters, limit),
		);
		let semantic_count = semantic.len();
		let catalog_records: Vec<ProductRecord> =
			catalog.iter().filter_map(Retrieved::record).cloned().collect();
		let catalog_count = catalog_records.len();

		if self.cfg.search.persist_catalog_results {
			self.persist_in_background(catalog_records);
		}

		let merged = merge::merge(
			semantic.into_iter().map(Retrieved::Record).collect(),
			catalog,
			weight,
		);
		let outcome = self.rerank_products(merged, query, limit as usize).await;

		tracing::info!(
			semantic_count,
			catalog_count,
			returned = outcome.products.len(),
			reranked = outcome.reranked,
			"Product search completed."
		);

		Ok(SearchProductsResponse {
			query: query.to_string(),
			products: outcome.products,
			semantic_count,
			catalog_count,
			reranked: outcome.reranked,
		})
	}
}
