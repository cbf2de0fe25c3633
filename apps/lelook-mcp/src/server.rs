use std::{net::SocketAddr, sync::Arc};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, Request, StatusCode},
	middleware::{self, Next},
	response::IntoResponse,
};
use color_eyre::Result;
use reqwest::{Client, RequestBuilder};
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::McpAuthState;

pub const TOOL_SHOPPING_ASSISTANT: &str = "shopping_assistant";
pub const TOOL_SEARCH_PRODUCTS: &str = "search_products_tool";
pub const TOOL_COMPARE_PRODUCTS: &str = "compare_products_tool";

pub const CATEGORIES: [&str; 6] = ["clothing", "furniture", "other", "phone", "car", "house"];

const HEADER_AUTHORIZATION: &str = "Authorization";
const PATH_SEARCH: &str = "/v1/products/search";
const PATH_COMPARE: &str = "/v1/products/compare";

const WORKFLOW_PROMPT: &str = "\
You are a concise shopping assistant.

For any shopping request, follow this exact workflow:
1. search_products_tool: search for products by query, budget, and category.
2. compare_products_tool: compare and rank the search results.

Rules:
- Clarify missing preferences (color, price range, style, brand, size) before searching.
- Always call compare_products_tool right after search_products_tool. Never skip it.
- Never call the tools out of order.
- Present results as a grid of cards with the product image (or a note that none is \
available), name, price, and link rather than as plain text.";

#[derive(Clone)]
struct LelookMcp {
	api_base: String,
	client: Client,
	auth_state: McpAuthState,
	tool_router: ToolRouter<Self>,
}
impl LelookMcp {
	fn new(api_base: String, auth_state: McpAuthState) -> Self {
		Self { api_base, client: Client::new(), auth_state, tool_router: Self::tool_router() }
	}

	fn apply_auth(&self, builder: RequestBuilder) -> RequestBuilder {
		match &self.auth_state {
			McpAuthState::Off => builder,
			McpAuthState::Bearer { token } =>
				builder.header(HEADER_AUTHORIZATION, format!("Bearer {token}")),
		}
	}

	async fn forward_post(&self, path: &str, body: Value) -> Result<CallToolResult, ErrorData> {
		let url = format!("{}{}", self.api_base, path);
		let response =
			self.apply_auth(self.client.post(url).json(&body)).send().await.map_err(|err| {
				tracing::warn!(error = %err, path, "LeLook API request failed.");

				ErrorData::internal_error(format!("LeLook API request failed: {err}"), None)
			})?;

		handle_response(response).await
	}
}

#[rmcp::tool_router]
impl LelookMcp {
	#[rmcp::tool(
		name = "shopping_assistant",
		description = "Call this first for any request to find or compare products. Returns the workflow to follow: search_products_tool, then compare_products_tool.",
		input_schema = empty_schema()
	)]
	async fn shopping_assistant(&self, _params: JsonObject) -> Result<CallToolResult, ErrorData> {
		Ok(CallToolResult::structured(workflow()))
	}

	#[rmcp::tool(
		name = "search_products_tool",
		description = "Search for products matching a query with optional category, price range, free shipping, and sale filters. Returns title, price, image, seller, and purchase link for each product.",
		input_schema = search_products_schema()
	)]
	async fn search_products_tool(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		check_category(&params)?;

		self.forward_post(PATH_SEARCH, Value::Object(params)).await
	}

	#[rmcp::tool(
		name = "compare_products_tool",
		description = "Compare a list of products and return the top five, ranked by price, rating, availability, and completeness.",
		input_schema = compare_products_schema()
	)]
	async fn compare_products_tool(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.forward_post(PATH_COMPARE, Value::Object(params)).await
	}
}

#[rmcp::tool_handler]
impl ServerHandler for LelookMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(format!(
				"LeLook shopping tools. Call {TOOL_SHOPPING_ASSISTANT} first for the workflow."
			)),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(bind_addr: &str, api_base: &str, auth_state: McpAuthState) -> Result<()> {
	let bind_addr: SocketAddr = bind_addr.parse()?;
	let api_base = normalize_api_base(api_base);
	let middleware_auth_state = auth_state.clone();
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let service = StreamableHttpService::new(
		move || Ok(LelookMcp::new(api_base.clone(), auth_state.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);
	let router = Router::new()
		.fallback_service(service)
		.layer(middleware::from_fn_with_state(middleware_auth_state, mcp_auth_middleware));
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, "MCP server listening.");

	axum::serve(listener, router).await?;

	Ok(())
}

fn workflow() -> Value {
	json!({ "system_prompt": WORKFLOW_PROMPT })
}

fn check_category(params: &JsonObject) -> Result<(), ErrorData> {
	match params.get("category") {
		None | Some(Value::Null) => Ok(()),
		Some(Value::String(category)) if CATEGORIES.contains(&category.as_str()) => Ok(()),
		Some(_) => Err(ErrorData::invalid_params(
			format!("category must be one of {}.", CATEGORIES.join(", ")),
			None,
		)),
	}
}

fn is_authorized(headers: &HeaderMap, auth_state: &McpAuthState) -> bool {
	match auth_state {
		McpAuthState::Off => true,
		McpAuthState::Bearer { token: expected } =>
			read_bearer_token(headers).is_some_and(|token| token == expected),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(HEADER_AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn normalize_api_base(raw: &str) -> String {
	let trimmed = raw.trim().trim_end_matches('/');
	let (scheme, rest) = if let Some(value) = trimmed.strip_prefix("http://") {
		("http://", value)
	} else if let Some(value) = trimmed.strip_prefix("https://") {
		("https://", value)
	} else {
		("http://", trimmed)
	};
	// The API runs on the same host; a wildcard bind is reached over loopback.
	let rest = if let Some(port) = rest.strip_prefix("0.0.0.0:") {
		format!("127.0.0.1:{port}")
	} else if let Some(port) = rest.strip_prefix("[::]:") {
		format!("127.0.0.1:{port}")
	} else {
		rest.to_string()
	};

	format!("{scheme}{rest}")
}

fn empty_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {}
	}))
}

fn search_products_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["query"],
		"properties": {
			"query": { "type": "string", "description": "What the user is looking for." },
			"category": {
				"type": ["string", "null"],
				"enum": ["clothing", "furniture", "other", "phone", "car", "house", null],
				"description": "The product category to filter results."
			},
			"min_price": { "type": ["number", "null"], "description": "Minimum price." },
			"max_price": { "type": ["number", "null"], "description": "Maximum price." },
			"free_shipping": { "type": ["boolean", "null"], "description": "Only free shipping." },
			"on_sale": { "type": ["boolean", "null"], "description": "Only products on sale." },
			"num_results": {
				"type": ["integer", "null"],
				"minimum": 1,
				"description": "The number of products to return."
			}
		}
	}))
}

fn compare_products_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["products"],
		"properties": {
			"products": {
				"type": "array",
				"description": "Products to compare, as returned by search_products_tool.",
				"items": {
					"type": "object",
					"additionalProperties": true,
					"properties": {
						"title": { "type": "string" },
						"price": { "type": "string" },
						"image_url": { "type": "string" },
						"source_url": { "type": "string" },
						"seller": { "type": "string" },
						"rating": { "type": ["number", "null"] },
						"reviews_count": { "type": ["integer", "null"] },
						"in_stock": { "type": "boolean" }
					}
				}
			}
		}
	}))
}

async fn handle_response(response: reqwest::Response) -> Result<CallToolResult, ErrorData> {
	let status = response.status();
	let bytes = response.bytes().await.map_err(|err| {
		ErrorData::internal_error(format!("LeLook API response error: {err}"), None)
	})?;
	let parsed = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| {
		let raw = String::from_utf8_lossy(&bytes).to_string();

		json!({ "raw": raw })
	});

	if status.is_success() {
		Ok(CallToolResult::structured(parsed))
	} else {
		tracing::warn!(%status, "LeLook API returned an error status.");

		Ok(CallToolResult::structured_error(parsed))
	}
}

async fn mcp_auth_middleware(
	State(auth_state): State<McpAuthState>,
	req: Request<Body>,
	next: Next,
) -> axum::response::Response {
	if !is_authorized(req.headers(), &auth_state) {
		return (StatusCode::UNAUTHORIZED, "A valid Bearer token is required.").into_response();
	}

	next.run(req).await
}
