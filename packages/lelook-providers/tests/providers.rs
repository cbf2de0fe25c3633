use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value, json};

use lelook_config::{CatalogProviderConfig, LlmProviderConfig};
use lelook_providers::catalog::CatalogFilters;

fn catalog_config() -> CatalogProviderConfig {
	CatalogProviderConfig {
		provider_id: "serpapi".to_string(),
		api_base: "https://serpapi.example".to_string(),
		api_key: "secret".to_string(),
		path: "/search.json".to_string(),
		engine: "google_shopping".to_string(),
		google_domain: "google.fr".to_string(),
		hl: "fr".to_string(),
		gl: "fr".to_string(),
		location: "Paris, Ile-de-France, France".to_string(),
		timeout_ms: 1_000,
	}
}

fn llm_config() -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "p".to_string(),
		api_base: "http://localhost".to_string(),
		api_key: "key".to_string(),
		path: "/chat/completions".to_string(),
		model: "m".to_string(),
		temperature: 0.1,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
	params.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		lelook_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut default_headers = Map::new();

	default_headers.insert("X-Retries".to_string(), json!(3));

	assert!(lelook_providers::auth_headers("secret", &default_headers).is_err());
}

#[test]
fn catalog_params_carry_locale_and_filters() {
	let filters = CatalogFilters {
		min_price: Some(10.0),
		max_price: None,
		free_shipping: Some(true),
		on_sale: Some(false),
		category: Some("furniture".to_string()),
	};
	let params =
		lelook_providers::catalog::build_query_params(&catalog_config(), "oak desk", &filters, 12);

	assert_eq!(param(&params, "q"), Some("oak desk"));
	assert_eq!(param(&params, "num"), Some("12"));
	assert_eq!(param(&params, "tbm"), Some("shop"));
	assert_eq!(param(&params, "google_domain"), Some("google.fr"));
	assert_eq!(param(&params, "min_price"), Some("10"));
	assert_eq!(param(&params, "max_price"), None);
	assert_eq!(param(&params, "free_shipping"), Some("true"));
	assert_eq!(param(&params, "on_sale"), Some("false"));
	assert_eq!(param(&params, "category"), Some("furniture"));
}

#[test]
fn catalog_params_skip_unset_filters() {
	let params = lelook_providers::catalog::build_query_params(
		&catalog_config(),
		"lamp",
		&CatalogFilters::default(),
		5,
	);

	for key in ["min_price", "max_price", "free_shipping", "on_sale", "category"] {
		assert_eq!(param(&params, key), None, "Unexpected {key} parameter.");
	}
}

#[test]
fn rerank_request_declares_strict_schema() {
	let summaries = vec![json!({ "index": 0, "title": "Lamp" })];
	let body = lelook_providers::rerank::build_request_body(&llm_config(), "desk lamp", &summaries)
		.expect("Failed to build rerank request.");
	let schema = &body["response_format"]["json_schema"];

	assert_eq!(schema["name"], "product_ranking");
	assert_eq!(schema["strict"], Value::Bool(true));
	assert_eq!(schema["schema"]["required"], json!(["ranked_indices", "reasoning"]));

	let user = body["messages"][1]["content"].as_str().expect("Missing user message.");

	assert!(user.contains("desk lamp"));
	assert!(user.contains("\"title\":\"Lamp\""));
}
