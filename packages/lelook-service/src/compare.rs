use serde::{Deserialize, Serialize};
use serde_json::Value;

use lelook_domain::{ComparedProduct, compare};

use crate::LelookService;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CompareProductsResponse {
	pub compared_products: Vec<ComparedProduct>,
	pub summary: String,
}

impl LelookService {
	/// Scores `products` and returns the best five for display.
	///
	/// Anything but a JSON array is treated as an empty list.
	pub fn compare_products(&self, products: &Value) -> CompareProductsResponse {
		if !products.is_array() {
			tracing::warn!("Compare input is not a list; returning no products.");
		}

		let compared_products = compare::rank_json(products);
		let summary = format!("Found {} top product recommendations", compared_products.len());

		CompareProductsResponse { compared_products, summary }
	}
}
