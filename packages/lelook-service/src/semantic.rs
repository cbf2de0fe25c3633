use lelook_domain::{ProductRecord, price};

use crate::{Error, LelookService, Result};

/// Over-fetch factor that leaves room for price post-filtering.
pub const OVERFETCH_FACTOR: u64 = 2;

#[derive(Clone, Copy, Debug, Default)]
pub struct SemanticQuery<'a> {
	pub query: &'a str,
	pub limit: u32,
	pub category: Option<&'a str>,
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
}

impl LelookService {
	/// Nearest-neighbor product lookup.
	///
	/// Any collaborator failure degrades to an empty list so the merge sees "no semantic
	/// contribution".
	pub async fn semantic_search(&self, query: SemanticQuery<'_>) -> Vec<ProductRecord> {
		match self.try_semantic_search(query).await {
			Ok(records) => records,
			Err(err) => {
				tracing::warn!(error = %err, "Semantic search degraded to empty results.");

				Vec::new()
			},
		}
	}

	async fn try_semantic_search(&self, query: SemanticQuery<'_>) -> Result<Vec<ProductRecord>> {
		let Some(index) = self.index.as_ref() else {
			return Err(Error::Unavailable {
				message: "Vector index is not initialized.".to_string(),
			});
		};

		if query.limit == 0 {
			return Ok(Vec::new());
		}

		let texts = [query.query.to_string()];
		let vector = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &texts)
			.await?
			.into_iter()
			.next()
			.ok_or_else(|| Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			})?;
		let category = query.category.map(str::trim).filter(|category| !category.is_empty());
		let hits = index.search(vector, u64::from(query.limit) * OVERFETCH_FACTOR, category).await?;
		let mut records = Vec::with_capacity(hits.len());

		for hit in hits {
			let Some(mut record) = ProductRecord::from_json(&hit.payload) else {
				tracing::warn!("Dropped vector index hit with a non-object payload.");

				continue;
			};

			if !price::within_bounds(&record.price, query.min_price, query.max_price) {
				continue;
			}

			record.score = Some(hit.score);

			records.push(record);
		}

		records.truncate(query.limit as usize);

		Ok(records)
	}
}
