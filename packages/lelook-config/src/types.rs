use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub rerank: Rerank,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub mcp_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Optional. Without it the catalog branch contributes nothing.
	pub catalog: Option<CatalogProviderConfig>,
	/// Optional. Without it results keep their merged order.
	pub rerank: Option<LlmProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	#[serde(default = "default_catalog_engine")]
	pub engine: String,
	pub google_domain: String,
	pub hl: String,
	pub gl: String,
	pub location: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_results: u32,
	pub max_results: u32,
	/// Share of the blended order key given to semantic matches, in 0.0-1.0.
	pub hybrid_weight: f32,
	pub persist_catalog_results: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_results: 10,
			max_results: 50,
			hybrid_weight: 0.6,
			persist_catalog_results: true,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Rerank {
	pub max_description_chars: u32,
}
impl Default for Rerank {
	fn default() -> Self {
		Self { max_description_chars: 300 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub auth_token: Option<String>,
}

fn default_catalog_engine() -> String {
	"google_shopping".to_string()
}
