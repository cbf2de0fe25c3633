use serde::{Deserialize, Serialize};

use lelook_domain::ProductRecord;

use crate::LelookService;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredProduct {
	pub id: String,
	#[serde(flatten)]
	pub product: ProductRecord,
}

impl LelookService {
	/// Lists up to `limit` stored products in index order.
	pub async fn list_products(&self, limit: u32) -> Vec<StoredProduct> {
		let Some(index) = self.index.as_ref() else {
			tracing::warn!("Vector index is not initialized; listing no products.");

			return Vec::new();
		};
		let points = match index.scroll(limit).await {
			Ok(points) => points,
			Err(err) => {
				tracing::warn!(error = %err, "Failed to list stored products.");

				return Vec::new();
			},
		};

		points
			.into_iter()
			.filter_map(|point| match ProductRecord::from_json(&point.payload) {
				Some(product) => Some(StoredProduct { id: point.id, product }),
				None => {
					tracing::warn!(id = %point.id, "Skipped a stored product with a bad payload.");

					None
				},
			})
			.collect()
	}
}
