use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
	response::Response,
};
use serde_json::{Map, Value, json};
use tower::util::ServiceExt;

use lelook_api::{routes, state::AppState};
use lelook_config::{
	CatalogProviderConfig, Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Qdrant,
	Rerank, Search, Security, Service, Storage,
};
use lelook_service::{
	BoxFuture, CatalogFilters, CatalogProvider, EmbeddingProvider, Error, LelookService,
	RerankProvider, Result,
};

struct DummyEmbedding;
impl EmbeddingProvider for DummyEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let vector = vec![0.0; cfg.dimensions as usize];

		Box::pin(async move { Ok(vec![vector; texts.len()]) })
	}
}

struct StaticCatalog;
impl CatalogProvider for StaticCatalog {
	fn search<'a>(
		&'a self,
		_cfg: &'a CatalogProviderConfig,
		query: &'a str,
		_filters: &'a CatalogFilters,
		_num_results: u32,
	) -> BoxFuture<'a, Result<Vec<Value>>> {
		let listings = vec![
			json!({ "title": format!("{query} one"), "price": "$10", "link": "https://shop/1" }),
			json!({ "title": format!("{query} two"), "price": "$12", "link": "https://shop/2" }),
		];

		Box::pin(async move { Ok(listings) })
	}
}

struct OfflineRerank;
impl RerankProvider for OfflineRerank {
	fn rank<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_query: &'a str,
		_summaries: &'a [Value],
	) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move { Err(Error::Provider { message: "offline".to_string() }) })
	}
}

fn test_config(auth_token: Option<&str>) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			mcp_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:1".to_string(),
				collection: "products".to_string(),
				vector_dim: 4,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/".to_string(),
				model: "test".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			catalog: Some(CatalogProviderConfig {
				provider_id: "serpapi".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/search.json".to_string(),
				engine: "google_shopping".to_string(),
				google_domain: "google.com".to_string(),
				hl: "en".to_string(),
				gl: "us".to_string(),
				location: "United States".to_string(),
				timeout_ms: 1_000,
			}),
			rerank: Some(LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/".to_string(),
				model: "test".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			}),
		},
		search: Search {
			default_results: 10,
			max_results: 50,
			hybrid_weight: 0.6,
			persist_catalog_results: false,
		},
		rerank: Rerank { max_description_chars: 300 },
		security: Security {
			bind_localhost_only: true,
			auth_token: auth_token.map(str::to_string),
		},
	}
}

fn test_app(auth_token: Option<&str>) -> Router {
	let providers = lelook_service::Providers::new(
		Arc::new(DummyEmbedding),
		Arc::new(StaticCatalog),
		Arc::new(OfflineRerank),
	);
	let service = LelookService::with_providers(test_config(auth_token), None, providers);

	routes::router(AppState::from_service(service))
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request.")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request.")
}

async fn read_json(response: Response) -> Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let response = test_app(None).oneshot(get("/health")).await.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_returns_catalog_products_without_an_index() {
	let response = test_app(None)
		.oneshot(post_json(
			"/v1/products/search",
			&json!({ "query": "red dress", "num_results": 5 }),
		))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["query"], "red dress");
	assert_eq!(json["semantic_count"], 0);
	assert_eq!(json["catalog_count"], 2);
	assert_eq!(json["reranked"], false);
	assert_eq!(json["products"][0]["title"], "red dress one");
	assert_eq!(json["products"][0]["source"], "internet");
	assert_eq!(json["products"][1]["source_url"], "https://shop/2");
}

#[tokio::test]
async fn search_rejects_an_empty_query() {
	let response = test_app(None)
		.oneshot(post_json("/v1/products/search", &json!({ "query": "   " })))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["message"], "query must be non-empty.");
}

#[tokio::test]
async fn search_rejects_zero_results() {
	let response = test_app(None)
		.oneshot(post_json(
			"/v1/products/search",
			&json!({ "query": "lamp", "num_results": 0 }),
		))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_bodies_get_a_json_error() {
	let request = Request::builder()
		.method("POST")
		.uri("/v1/products/search")
		.header("content-type", "application/json")
		.body(Body::from("{ not json"))
		.expect("Failed to build request.");
	let response = test_app(None).oneshot(request).await.expect("Failed to call search.");

	assert!(response.status().is_client_error());

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn compare_ranks_the_given_products() {
	let products = json!({
		"products": [
			{ "title": "Pricey", "price": "$100", "source_url": "https://shop/p" },
			{
				"title": "Cheap",
				"price": "$10",
				"source_url": "https://shop/c",
				"image_url": "https://img/c",
			},
		]
	});
	let response = test_app(None)
		.oneshot(post_json("/v1/products/compare", &products))
		.await
		.expect("Failed to call compare.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["compared_products"][0]["name"], "Cheap");
	assert_eq!(json["compared_products"][0]["rank"], 1);
	assert_eq!(json["compared_products"][1]["name"], "Pricey");
	assert_eq!(json["summary"], "Found 2 top product recommendations");
}

#[tokio::test]
async fn compare_treats_non_lists_as_empty() {
	let response = test_app(None)
		.oneshot(post_json("/v1/products/compare", &json!({ "products": "nope" })))
		.await
		.expect("Failed to call compare.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["compared_products"], json!([]));
	assert_eq!(json["summary"], "Found 0 top product recommendations");
}

#[tokio::test]
async fn listing_without_an_index_is_empty() {
	let response =
		test_app(None).oneshot(get("/v1/products?limit=5")).await.expect("Failed to call list.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(read_json(response).await["products"], json!([]));
}

#[tokio::test]
async fn configured_token_is_required_for_product_routes() {
	let app = test_app(Some("secret"));
	let body = json!({ "products": [] });
	let denied = app
		.clone()
		.oneshot(post_json("/v1/products/compare", &body))
		.await
		.expect("Failed to call compare.");

	assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(read_json(denied).await["error_code"], "UNAUTHORIZED");

	let mut request = post_json("/v1/products/compare", &body);

	request
		.headers_mut()
		.insert("authorization", "Bearer secret".parse().expect("Invalid header value."));

	let allowed = app.clone().oneshot(request).await.expect("Failed to call compare.");

	assert_eq!(allowed.status(), StatusCode::OK);

	let health = app.oneshot(get("/health")).await.expect("Failed to call /health.");

	assert_eq!(health.status(), StatusCode::OK);
}
