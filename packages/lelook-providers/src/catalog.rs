use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Optional narrowing applied by the shopping catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFilters {
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
	pub free_shipping: Option<bool>,
	pub on_sale: Option<bool>,
	pub category: Option<String>,
}

/// Queries a SerpAPI-style shopping endpoint and returns the raw `shopping_results` listings.
pub async fn search(
	cfg: &lelook_config::CatalogProviderConfig,
	query: &str,
	filters: &CatalogFilters,
	num_results: u32,
) -> Result<Vec<Value>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let params = build_query_params(cfg, query, filters, num_results);
	let res = client.get(url).query(&params).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_catalog_response(json)
}

pub fn build_query_params(
	cfg: &lelook_config::CatalogProviderConfig,
	query: &str,
	filters: &CatalogFilters,
	num_results: u32,
) -> Vec<(&'static str, String)> {
	let mut params = vec![
		("api_key", cfg.api_key.clone()),
		("engine", cfg.engine.clone()),
		("q", query.to_string()),
		("num", num_results.to_string()),
		("google_domain", cfg.google_domain.clone()),
		("hl", cfg.hl.clone()),
		("gl", cfg.gl.clone()),
		("location", cfg.location.clone()),
		("tbm", "shop".to_string()),
	];

	if let Some(min_price) = filters.min_price {
		params.push(("min_price", min_price.to_string()));
	}
	if let Some(max_price) = filters.max_price {
		params.push(("max_price", max_price.to_string()));
	}
	if let Some(free_shipping) = filters.free_shipping {
		params.push(("free_shipping", free_shipping.to_string()));
	}
	if let Some(on_sale) = filters.on_sale {
		params.push(("on_sale", on_sale.to_string()));
	}
	if let Some(category) = filters.category.as_deref().filter(|category| !category.is_empty()) {
		params.push(("category", category.to_string()));
	}

	params
}

fn parse_catalog_response(json: Value) -> Result<Vec<Value>> {
	if let Some(error) = json.get("error") {
		let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());

		return Err(Error::InvalidResponse {
			message: format!("Catalog provider returned an error: {message}"),
		});
	}

	match json.get("shopping_results") {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(Value::Array(items)) => Ok(items.clone()),
		Some(_) => Err(Error::InvalidResponse {
			message: "Catalog shopping_results must be an array.".to_string(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn missing_results_are_empty() {
		let listings =
			parse_catalog_response(json!({ "search_metadata": {} })).expect("Failed to parse.");

		assert!(listings.is_empty());
	}

	#[test]
	fn returns_shopping_results_in_order() {
		let listings = parse_catalog_response(json!({
			"shopping_results": [{ "title": "a" }, { "title": "b" }]
		}))
		.expect("Failed to parse.");

		assert_eq!(listings.len(), 2);
		assert_eq!(listings[1]["title"], "b");
	}

	#[test]
	fn top_level_error_is_rejected() {
		let err = parse_catalog_response(json!({ "error": "Invalid API key." }))
			.expect_err("Expected catalog error.");

		assert!(err.to_string().contains("Invalid API key."), "Unexpected error: {err}");
	}
}
