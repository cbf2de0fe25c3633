use axum::{
	Json, Router,
	extract::{
		Query, Request, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;
use lelook_service::{
	CompareProductsResponse, Error as ServiceError, SearchProductsRequest, SearchProductsResponse,
	StoredProduct,
};

pub const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct CompareProductsRequest {
	#[serde(default)]
	pub products: Value,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
	pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
	pub products: Vec<StoredProduct>,
}

pub fn router(state: AppState) -> Router {
	let products = Router::new()
		.route("/v1/products/search", post(search_products))
		.route("/v1/products/compare", post(compare_products))
		.route("/v1/products", get(list_products))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

	Router::new().route("/health", get(health)).merge(products).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_products(
	State(state): State<AppState>,
	payload: Result<Json<SearchProductsRequest>, JsonRejection>,
) -> Result<Json<SearchProductsResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search_products(payload).await?;

	Ok(Json(response))
}

async fn compare_products(
	State(state): State<AppState>,
	payload: Result<Json<CompareProductsRequest>, JsonRejection>,
) -> Result<Json<CompareProductsResponse>, ApiError> {
	let Json(payload) = payload?;

	Ok(Json(state.service.compare_products(&payload.products)))
}

async fn list_products(
	State(state): State<AppState>,
	query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<Json<ListProductsResponse>, ApiError> {
	let Query(query) = query?;
	let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
	let products = state.service.list_products(limit).await;

	Ok(Json(ListProductsResponse { products }))
}

async fn require_bearer(State(state): State<AppState>, req: Request, next: Next) -> Response {
	if let Some(expected) = state.service.cfg.security.auth_token.as_deref()
		&& read_bearer_token(req.headers()) != Some(expected)
	{
		return ApiError::new(
			StatusCode::UNAUTHORIZED,
			"UNAUTHORIZED",
			"A valid Bearer token is required.",
		)
		.into_response();
	}

	next.run(req).await
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", message),
			ServiceError::Unavailable { message } =>
				Self::new(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", message),
			ServiceError::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message),
			ServiceError::Storage { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message),
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		Self::new(err.status(), "INVALID_REQUEST", err.body_text())
	}
}
impl From<QueryRejection> for ApiError {
	fn from(err: QueryRejection) -> Self {
		Self::new(err.status(), "INVALID_REQUEST", err.body_text())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
